//! Adapter module - maze sessions served over a TCP socket with a JSON protocol
//!
//! Clients drive any number of named maze sessions and receive rendered
//! frames back as base64 encoded PNG or JPEG images.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: client connects (default: 127.0.0.1:7878)
//! 2. **Handshake**: client sends `hello`, server responds with `welcome`
//! 3. **Commanding**: client sends `command` messages naming a session and an
//!    action; each is answered with a `frame`, an `ack` or an `error`
//!
//! ## Client → Server
//!
//! - **hello**: client info, protocol version, preferred image format
//! - **command**: `new` (with optional `size`/`seed`), `turnLeft`,
//!   `turnRight`, `stepForward`, `stepBackward`, `toggleView`
//!
//! ## Server → Client
//!
//! - **welcome**: client id and host capabilities
//! - **frame**: session state plus the rendered view
//! - **ack**: `blocked` when a step ran into a wall (no new frame)
//! - **error**: code and message
//!
//! A command for a session id that does not exist yet creates a
//! default-size maze under that id first.
//!
//! # Environment Variables
//!
//! - `MAZEWALK_HOST`, `MAZEWALK_PORT`, `MAZEWALK_MAX_PENDING`: listener and
//!   command queue ([`ServerConfig`])
//! - `MAZEWALK_FRAME_SIZE`, `MAZEWALK_FORMAT`, `MAZEWALK_JPEG_QUALITY`,
//!   `MAZEWALK_MAX_SESSIONS`, `MAZEWALK_COLORS`: rendering and sessions
//!   ([`HostConfig`])
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1,"client":{"name":"bot","version":"1.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":2,"protocol_version":"1.0.0","client_id":1,"capabilities":{...}}
//! Client -> Server: {"type":"command","seq":2,"ts":3,"session":"alice","action":"new","size":20}
//! Server -> Client: {"type":"frame","seq":2,"ts":4,"session":"alice","row":1,"col":1,"heading":"down",...,"image":"iVBORw0..."}
//! Client -> Server: {"type":"command","seq":3,"ts":5,"session":"alice","action":"turnLeft"}
//! ```
//!
//! # Implementation
//!
//! - Sockets run on **tokio** tasks ([`server`])
//! - Sessions live in a single synchronous host loop ([`host`], [`runtime`])
//!   fed through a bounded channel; a full queue answers `backpressure`

pub mod config;
pub mod encode;
pub mod host;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use mazewalk_core as core;
pub use mazewalk_engine as engine;
pub use mazewalk_types as types;

pub use config::{load_color_scheme, parse_color_scheme, HostConfig};
pub use encode::{EncodeError, FrameEncoder};
pub use host::{Host, HostReply, SessionStore, StoreError};
pub use protocol::*;
pub use runtime::{process_command, run_host, Adapter, InboundCommand, OutboundMessage, SessionCommand};
pub use server::{check_tcp_listen_available, run_server, ServerConfig};
