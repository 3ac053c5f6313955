//! Adapter runtime integration.
//!
//! Bridges the synchronous host loop with the async TCP server: the server
//! pushes accepted commands into a bounded channel, the host drains it one
//! command at a time and pushes reply lines back.

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::host::{Host, HostReply};
use crate::protocol::{CommandAction, FrameFormat};
use crate::server::{run_server, ServerConfig};

/// Command delivered to the host loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    /// Image format the client asked for in its hello.
    pub format: Option<FrameFormat>,
    pub command: SessionCommand,
}

/// One operation on one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCommand {
    pub session: String,
    pub action: CommandAction,
    pub size: Option<usize>,
    pub seed: Option<u32>,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the TCP server on a background runtime.
    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None).await {
                log::error!("server stopped: {:#}", e);
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
        })
    }

    /// Block until the next command. None once the server has stopped.
    pub fn recv_blocking(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.blocking_recv()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}

/// Apply one inbound command and build the message carrying its reply.
pub fn process_command(host: &mut Host, inbound: &InboundCommand) -> Option<OutboundMessage> {
    let reply = host.handle(inbound.seq, &inbound.command, inbound.format);
    if let HostReply::Error(e) = &reply {
        log::debug!("client {} seq {}: {:?}", inbound.client_id, inbound.seq, e.code);
    }
    match reply.to_line() {
        Ok(line) => Some(OutboundMessage::ToClient {
            client_id: inbound.client_id,
            line,
        }),
        Err(e) => {
            log::error!("failed to serialize reply {}: {}", reply.seq(), e);
            None
        }
    }
}

/// Serve commands until the server stops.
pub fn run_host(adapter: &mut Adapter, host: &mut Host) {
    while let Some(inbound) = adapter.recv_blocking() {
        if let Some(out) = process_command(host, &inbound) {
            adapter.send(out);
        }
    }
    log::info!("command channel closed, host loop exiting");
}
