use crate::types::{Direction, ViewMode};

/// Plain copy of a session's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionSnapshot {
    pub size: usize,
    pub seed: u32,
    pub side: usize,
    pub row: usize,
    pub col: usize,
    pub heading: Direction,
    pub view: ViewMode,
    pub at_finish: bool,
    pub finished: bool,
    pub steps: u32,
}
