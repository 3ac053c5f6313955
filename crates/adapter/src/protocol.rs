//! Protocol module - JSON message types for the maze host
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sequence number)
//! and `ts` (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::types::{
    NavAction, DEFAULT_FRAME_SIZE, MAX_MAZE_SIZE, MAZE_SIZE_PRESETS, MIN_MAZE_SIZE,
};

/// Major version accepted from clients.
pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Host Messages ==============

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    /// Preferred image format for frames; the host default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FrameFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Command message: one operation on one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub session: String,
    pub action: CommandAction,
    /// Maze size for `new`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Generator seed for `new`; random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "command")]
    Command,
}

/// What a command asks of its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAction {
    NewMaze,
    Nav(NavAction),
}

impl CommandAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandAction::NewMaze => "new",
            CommandAction::Nav(a) => a.as_str(),
        }
    }
}

impl<'de> Deserialize<'de> for CommandAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("new") || s.eq_ignore_ascii_case("newMaze") {
            return Ok(Self::NewMaze);
        }
        NavAction::from_str(&s)
            .map(Self::Nav)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown action: {}", s)))
    }
}

impl Serialize for CommandAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============== Host -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameFormat {
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "jpeg", alias = "jpg")]
    Jpeg,
}

impl FrameFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Some(FrameFormat::Png),
            "jpeg" | "jpg" => Some(FrameFormat::Jpeg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameFormat::Png => "png",
            FrameFormat::Jpeg => "jpeg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub capabilities: HostCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostCapabilities {
    pub formats: Vec<FrameFormat>,
    pub actions: Vec<String>,
    pub size_presets: Vec<usize>,
    pub min_size: usize,
    pub max_size: usize,
    pub frame_size: u32,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        let nav = [
            NavAction::TurnLeft,
            NavAction::TurnRight,
            NavAction::StepForward,
            NavAction::StepBackward,
            NavAction::ToggleView,
        ];
        Self {
            formats: vec![FrameFormat::Png, FrameFormat::Jpeg],
            actions: std::iter::once(CommandAction::NewMaze)
                .chain(nav.into_iter().map(CommandAction::Nav))
                .map(|a| a.as_str().to_string())
                .collect(),
            size_presets: MAZE_SIZE_PRESETS.to_vec(),
            min_size: MIN_MAZE_SIZE,
            max_size: MAX_MAZE_SIZE,
            frame_size: DEFAULT_FRAME_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameType {
    #[serde(rename = "frame")]
    Frame,
}

/// A rendered view plus the session state it shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMessage {
    #[serde(rename = "type")]
    pub msg_type: FrameType,
    pub seq: u64,
    pub ts: u64,
    pub session: String,
    pub action: String,
    pub size: usize,
    pub seed: u32,
    pub row: usize,
    pub col: usize,
    pub heading: String,
    pub view: String,
    pub at_finish: bool,
    pub steps: u32,
    pub format: FrameFormat,
    pub width: u32,
    pub height: u32,
    /// FNV-1a of the raw RGB pixels.
    pub checksum: String,
    /// Base64 of the encoded image.
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    /// Step rejected by a wall; no new frame.
    #[serde(rename = "blocked")]
    Blocked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub session: String,
    pub action: String,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "invalid_size")]
    InvalidSize,
    #[serde(rename = "render_failed")]
    RenderFailed,
    #[serde(rename = "backpressure")]
    Backpressure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    struct Header {
        #[serde(rename = "type")]
        msg_type: Option<String>,
        seq: Option<u64>,
    }

    let header = serde_json::from_str::<Header>(json)?;
    match header.msg_type.as_deref() {
        Some("hello") => serde_json::from_str(json).map(ParsedMessage::Hello),
        Some("command") => serde_json::from_str(json).map(ParsedMessage::Command),
        // Unknown message type is not a hard parse error for the protocol.
        _ => Ok(ParsedMessage::Unknown(UnknownMessage {
            seq: header.seq.unwrap_or(0),
        })),
    }
}

// ============== Utility Functions ==============

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        format: None,
    }
}

pub fn create_command(seq: u64, session: &str, action: CommandAction) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        session: session.to_string(),
        action,
        size: None,
        seed: None,
    }
}

pub fn create_welcome(seq: u64, client_id: u64, capabilities: HostCapabilities) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        capabilities,
    }
}

pub fn create_ack(seq: u64, session: &str, action: &str, status: AckStatus) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        session: session.to_string(),
        action: action.to_string(),
        status,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Whether a client's protocol version shares our major version.
pub fn protocol_compatible(version: &str) -> bool {
    let major = |v: &str| v.split('.').next().map(str::to_string);
    major(version).is_some() && major(version) == major(PROTOCOL_VERSION)
}

pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","format":"jpeg"}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Hello(h) => {
                assert_eq!(h.seq, 1);
                assert_eq!(h.client.name, "bot");
                assert_eq!(h.format, Some(FrameFormat::Jpeg));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_command_actions() {
        let json = r#"{"type":"command","seq":2,"ts":1,"session":"alice","action":"stepForward"}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Command(c) => {
                assert_eq!(c.session, "alice");
                assert_eq!(c.action, CommandAction::Nav(NavAction::StepForward));
                assert_eq!(c.size, None);
            }
            other => panic!("unexpected {:?}", other),
        }

        let json = r#"{"type":"command","seq":3,"ts":1,"session":"a","action":"new","size":20,"seed":9}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Command(c) => {
                assert_eq!(c.action, CommandAction::NewMaze);
                assert_eq!((c.size, c.seed), (Some(20), Some(9)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_is_error() {
        let json = r#"{"type":"command","seq":2,"ts":1,"session":"a","action":"jump"}"#;
        assert!(parse_message(json).is_err());
    }

    #[test]
    fn test_unknown_type_keeps_seq() {
        match parse_message(r#"{"type":"ping","seq":7}"#).unwrap() {
            ParsedMessage::Unknown(u) => assert_eq!(u.seq, 7),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_message("not json").is_err());
    }

    #[test]
    fn test_create_error() {
        let err = create_error(4, ErrorCode::Backpressure, "full");
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["code"], "backpressure");
        assert_eq!(v["seq"], 4);
    }

    #[test]
    fn test_ack_serializes_status() {
        let ack = create_ack(5, "s", "stepForward", AckStatus::Blocked);
        let v = serde_json::to_value(&ack).unwrap();
        assert_eq!(v["status"], "blocked");
        assert_eq!(v["action"], "stepForward");
    }

    #[test]
    fn test_protocol_compatible() {
        assert!(protocol_compatible("1.2.0"));
        assert!(!protocol_compatible("2.0.0"));
        assert!(!protocol_compatible(""));
    }

    #[test]
    fn test_command_serde_roundtrip() {
        let cmd = create_command(3, "bob", CommandAction::Nav(NavAction::ToggleView));
        let line = serde_json::to_string(&cmd).unwrap();
        assert!(line.contains(r#""action":"toggleView""#));
        match parse_message(&line).unwrap() {
            ParsedMessage::Command(c) => assert_eq!(c.action, cmd.action),
            other => panic!("unexpected {:?}", other),
        }
    }
}
