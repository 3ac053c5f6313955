//! Mazewalk (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the binaries, the
//! integration tests and the benches can write `mazewalk::{core, engine, ...}`.

pub use mazewalk_adapter as adapter;
pub use mazewalk_core as core;
pub use mazewalk_engine as engine;
pub use mazewalk_input as input;
pub use mazewalk_term as term;
pub use mazewalk_types as types;
