//! TCP server for the maze host
//!
//! Handles incoming connections and manages client lifecycle. Every client
//! gets its own writer task; replies from the host loop are routed to it by
//! client id. Uses tokio for async networking.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{InboundCommand, OutboundMessage, SessionCommand};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
    /// Advertised in `welcome`.
    pub capabilities: HostCapabilities,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 32,
            capabilities: HostCapabilities::default(),
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("MAZEWALK_HOST").unwrap_or(defaults.host);
        let port = env::var("MAZEWALK_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("MAZEWALK_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
            capabilities: defaults.capabilities,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Fail fast when the listen port is taken, before any runtime is started.
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    std::net::TcpListener::bind((host, port)).map(|_| ())
}

/// Handle to a connected client
struct ClientHandle {
    handshaken: bool,
    last_seq: Option<u64>,
    format: Option<FrameFormat>,
    tx: mpsc::UnboundedSender<String>,
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    clients: RwLock<HashMap<usize, ClientHandle>>,
}

impl ServerState {
    async fn send(&self, client_id: usize, line: String) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.get(&client_id) {
            let _ = c.tx.send(line);
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients.get(&client_id).map(|c| c.handshaken).unwrap_or(false)
    }

    /// Enforce strictly increasing seq per client.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.get_mut(&client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn format(&self, client_id: usize) -> Option<FrameFormat> {
        let clients = self.clients.read().await;
        clients.get(&client_id).and_then(|c| c.format)
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    log::info!("maze host listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        clients: RwLock::new(HashMap::new()),
    });

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        state.send(client_id, line).await;
                    }
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state, command_tx).await {
                log::warn!("client {} error: {}", client_id, e);
            }
            log::info!("client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.clients.write().await.insert(
        client_id,
        ClientHandle {
            handshaken: false,
            last_seq: None,
            format: None,
            tx: tx.clone(),
        },
    );

    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
        }
    });

    let reply = |msg: ErrorMessage| {
        if let Ok(line) = serde_json::to_string(&msg) {
            let _ = tx.send(line);
        }
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    reply(seq_error(hello.seq));
                    continue;
                }

                if !protocol_compatible(&hello.protocol_version) {
                    log::warn!(
                        "client {} speaks protocol {}, expected {}",
                        client_id,
                        hello.protocol_version,
                        PROTOCOL_VERSION
                    );
                    reply(create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    ));
                    break;
                }

                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.get_mut(&client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.format = hello.format;
                    }
                }
                log::debug!("client {} is {} {}", client_id, hello.client.name, hello.client.version);

                let welcome = create_welcome(
                    hello.seq,
                    client_id as u64,
                    state.config.capabilities.clone(),
                );
                if let Ok(line) = serde_json::to_string(&welcome) {
                    let _ = tx.send(line);
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    reply(create_error(
                        cmd.seq,
                        ErrorCode::HandshakeRequired,
                        "Send hello before command",
                    ));
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply(seq_error(cmd.seq));
                    continue;
                }
                if cmd.session.trim().is_empty() {
                    reply(create_error(
                        cmd.seq,
                        ErrorCode::InvalidCommand,
                        "session id must not be empty",
                    ));
                    continue;
                }

                let inbound = InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    format: state.format(client_id).await,
                    command: SessionCommand {
                        session: cmd.session,
                        action: cmd.action,
                        size: cmd.size,
                        seed: cmd.seed,
                    },
                };

                // Backpressure: bounded queue.
                match command_tx.try_send(inbound) {
                    Ok(()) => {
                        // The host loop replies once the command is applied.
                    }
                    Err(TrySendError::Full(_)) => {
                        log::warn!("client {}: command queue full, dropping seq {}", client_id, cmd.seq);
                        reply(create_error(
                            cmd.seq,
                            ErrorCode::Backpressure,
                            "Command queue is full",
                        ));
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                reply(create_error(
                    unknown.seq,
                    ErrorCode::InvalidCommand,
                    "Unknown message type",
                ));
            }

            Err(e) => {
                log::warn!("client {} sent malformed message: {}", client_id, e);
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply(create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                ));
            }
        }
    }

    state.clients.write().await.remove(&client_id);
    drop(reply);
    drop(tx);
    let _ = write_task.await;
    Ok(())
}

fn seq_error(seq: u64) -> ErrorMessage {
    create_error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing")
}

/// Pull `"seq": <digits>` out of a line that failed to parse.
fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}
