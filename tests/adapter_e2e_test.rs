use std::net::SocketAddr;
use std::time::Duration;

use base64::Engine;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use mazewalk::adapter::protocol::{create_hello, FrameFormat, FrameMessage, PROTOCOL_VERSION};
use mazewalk::adapter::server::{run_server, ServerConfig};
use mazewalk::adapter::{process_command, CommandAction, Host, HostConfig, InboundCommand, OutboundMessage};
use mazewalk::core::MazeSession;
use mazewalk::engine::render_session;
use mazewalk::types::{ColorScheme, NavAction};

struct TestServer {
    addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    handle: JoinHandle<()>,
}

async fn start_server(max_pending: usize) -> TestServer {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands: max_pending,
        ..ServerConfig::default()
    };

    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    TestServer {
        addr,
        cmd_rx,
        out_tx,
        handle,
    }
}

async fn connect(addr: SocketAddr) -> (Lines<BufReader<OwnedReadHalf>>, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, write_half) = stream.into_split();
    (BufReader::new(read_half).lines(), write_half)
}

async fn send(writer: &mut OwnedWriteHalf, line: &str) {
    writer.write_all(line.as_bytes()).await.unwrap();
    writer.write_all(b"\n").await.unwrap();
    writer.flush().await.unwrap();
}

async fn recv(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> serde_json::Value {
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timed out waiting for a line")
        .unwrap()
        .expect("connection closed");
    serde_json::from_str(&line).unwrap()
}

async fn handshake(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    writer: &mut OwnedWriteHalf,
    format: Option<FrameFormat>,
) -> serde_json::Value {
    let mut hello = create_hello(1, "e2e-test", PROTOCOL_VERSION);
    hello.format = format;
    send(writer, &serde_json::to_string(&hello).unwrap()).await;
    recv(lines).await
}

async fn next_inbound(rx: &mut mpsc::Receiver<InboundCommand>) -> InboundCommand {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .expect("expected inbound command")
}

#[tokio::test]
async fn adapter_new_maze_frame_and_blocked_step() {
    let mut server = start_server(8).await;
    let config = HostConfig {
        frame_size: 64,
        ..HostConfig::default()
    };
    let mut host = Host::new(&config, ColorScheme::default());

    let (mut lines, mut writer) = connect(server.addr).await;
    let welcome = handshake(&mut lines, &mut writer, Some(FrameFormat::Png)).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["protocol_version"], PROTOCOL_VERSION);
    assert_eq!(welcome["capabilities"]["size_presets"], serde_json::json!([10, 20, 50]));

    // new maze
    send(
        &mut writer,
        r#"{"type":"command","seq":2,"ts":1,"session":"alice","action":"new","size":10,"seed":5}"#,
    )
    .await;
    let inbound = next_inbound(&mut server.cmd_rx).await;
    assert_eq!(inbound.seq, 2);
    assert_eq!(inbound.format, Some(FrameFormat::Png));
    assert_eq!(inbound.command.session, "alice");
    assert_eq!(inbound.command.action, CommandAction::NewMaze);
    assert_eq!((inbound.command.size, inbound.command.seed), (Some(10), Some(5)));

    server.out_tx.send(process_command(&mut host, &inbound).unwrap()).unwrap();
    let frame: FrameMessage = serde_json::from_value(recv(&mut lines).await).unwrap();
    assert_eq!(frame.seq, 2);
    assert_eq!(frame.session, "alice");
    assert_eq!((frame.row, frame.col), (1, 1));
    assert_eq!(frame.view, "firstPerson");
    assert_eq!((frame.width, frame.height), (64, 64));

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&frame.image)
        .unwrap();
    let image = image::load_from_memory(&bytes).unwrap();
    assert_eq!((image.width(), image.height()), (64, 64));

    let local = render_session(&MazeSession::new(10, 5).unwrap(), &ColorScheme::default(), 64);
    assert_eq!(frame.checksum, format!("{:016x}", local.checksum()));
    assert_eq!(image.to_rgb8().into_raw(), local.to_rgb8());

    // The start node is in the corner, so backing up always hits the border.
    send(
        &mut writer,
        r#"{"type":"command","seq":3,"ts":2,"session":"alice","action":"stepBackward"}"#,
    )
    .await;
    let inbound = next_inbound(&mut server.cmd_rx).await;
    assert_eq!(inbound.command.action, CommandAction::Nav(NavAction::StepBackward));
    server.out_tx.send(process_command(&mut host, &inbound).unwrap()).unwrap();
    let ack = recv(&mut lines).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 3);
    assert_eq!(ack["status"], "blocked");

    // Replayed seq never reaches the host.
    send(
        &mut writer,
        r#"{"type":"command","seq":3,"ts":3,"session":"alice","action":"turnLeft"}"#,
    )
    .await;
    let err = recv(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "invalid_command");
    assert!(server.cmd_rx.try_recv().is_err());

    // Size out of range is rejected by the host.
    send(
        &mut writer,
        r#"{"type":"command","seq":4,"ts":4,"session":"alice","action":"new","size":2}"#,
    )
    .await;
    let inbound = next_inbound(&mut server.cmd_rx).await;
    server.out_tx.send(process_command(&mut host, &inbound).unwrap()).unwrap();
    let err = recv(&mut lines).await;
    assert_eq!(err["seq"], 4);
    assert_eq!(err["code"], "invalid_size");
    assert_eq!(host.store().len(), 1);

    server.handle.abort();
}

#[tokio::test]
async fn adapter_command_before_hello_is_rejected() {
    let mut server = start_server(8).await;
    let (mut lines, mut writer) = connect(server.addr).await;

    send(
        &mut writer,
        r#"{"type":"command","seq":1,"ts":1,"session":"s","action":"turnLeft"}"#,
    )
    .await;
    let err = recv(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["seq"], 1);
    assert_eq!(err["code"], "handshake_required");
    assert!(server.cmd_rx.try_recv().is_err());

    server.handle.abort();
}

#[tokio::test]
async fn adapter_protocol_mismatch_closes_connection() {
    let server = start_server(8).await;
    let (mut lines, mut writer) = connect(server.addr).await;

    let hello = create_hello(1, "e2e-test", "2.0.0");
    send(&mut writer, &serde_json::to_string(&hello).unwrap()).await;
    let err = recv(&mut lines).await;
    assert_eq!(err["code"], "protocol_mismatch");

    let next = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .unwrap()
        .unwrap();
    assert!(next.is_none());

    server.handle.abort();
}

#[tokio::test]
async fn adapter_backpressure_returns_error() {
    let mut server = start_server(1).await;
    let (mut lines, mut writer) = connect(server.addr).await;
    let _welcome = handshake(&mut lines, &mut writer, None).await;

    // Nobody drains the queue: the first command fills it.
    send(
        &mut writer,
        r#"{"type":"command","seq":2,"ts":1,"session":"s","action":"turnLeft"}"#,
    )
    .await;
    send(
        &mut writer,
        r#"{"type":"command","seq":3,"ts":2,"session":"s","action":"turnRight"}"#,
    )
    .await;

    let err = recv(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["seq"], 3);
    assert_eq!(err["code"], "backpressure");

    let queued = next_inbound(&mut server.cmd_rx).await;
    assert_eq!(queued.seq, 2);
    assert_eq!(queued.format, None);

    server.handle.abort();
}

#[tokio::test]
async fn adapter_malformed_and_unknown_messages() {
    let server = start_server(8).await;
    let (mut lines, mut writer) = connect(server.addr).await;
    let _welcome = handshake(&mut lines, &mut writer, None).await;

    send(&mut writer, r#"{"type":"ping","seq":5,"ts":1}"#).await;
    let err = recv(&mut lines).await;
    assert_eq!(err["seq"], 5);
    assert_eq!(err["code"], "invalid_command");

    send(&mut writer, r#"{"type":"command","seq":6,"ts":1,"session":"s","action":"jump"}"#).await;
    let err = recv(&mut lines).await;
    assert_eq!(err["seq"], 6);
    assert_eq!(err["code"], "invalid_command");

    server.handle.abort();
}
