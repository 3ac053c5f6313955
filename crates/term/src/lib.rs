//! Terminal host rendering.
//!
//! Rendered maze frames are shown with half-block glyphs (two pixels per
//! cell) above a status line. Everything except [`TerminalRenderer`] is pure
//! and renders into a [`FrameBuffer`] that can be inspected in tests.

pub mod fb;
pub mod maze_view;
pub mod renderer;

pub use mazewalk_core as core;
pub use mazewalk_engine as engine;
pub use mazewalk_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, HALF_BLOCK};
pub use maze_view::{MazeView, Viewport, STATUS_ROWS};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
