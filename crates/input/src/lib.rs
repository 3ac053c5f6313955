//! Terminal input module.
//!
//! Maps `crossterm` key events into [`InputCommand`]s. Navigation keys become
//! [`NavAction`](crate::types::NavAction)s; the rest drive the host (new
//! maze, quit). Independent of any UI framework.

pub mod map;

pub use mazewalk_types as types;

pub use map::{handle_key_event, should_quit, InputCommand};
