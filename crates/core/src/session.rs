//! Session module - one maze plus the viewer walking it
//!
//! A session is what a host keeps per player: the immutable grid, the mutable
//! navigation state and the bookkeeping needed to describe the session back to
//! a client. Sessions share nothing with each other.

use crate::generator::{KruskalGenerator, MazeGenerator};
use crate::grid::{GridError, MazeGrid};
use crate::nav::NavigationState;
use crate::snapshot::SessionSnapshot;
use crate::types::{normalize_maze_size, NavAction};

/// Result of applying one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    pub action: NavAction,
    /// False only for a step the maze rejected.
    pub changed: bool,
    pub at_finish: bool,
}

#[derive(Debug, Clone)]
pub struct MazeSession {
    size: usize,
    seed: u32,
    grid: MazeGrid,
    nav: NavigationState,
    steps: u32,
    finished: bool,
}

impl MazeSession {
    /// Generate a new maze with the default Kruskal generator.
    pub fn new(size: usize, seed: u32) -> Result<Self, GridError> {
        Self::with_generator(size, seed, &mut KruskalGenerator::new(seed))
    }

    /// Generate a new maze with a caller-supplied generator. `seed` is only recorded.
    pub fn with_generator(
        size: usize,
        seed: u32,
        generator: &mut impl MazeGenerator,
    ) -> Result<Self, GridError> {
        let grid = MazeGrid::generate(size, generator)?;
        Ok(Self::from_grid(grid, seed))
    }

    pub fn from_grid(grid: MazeGrid, seed: u32) -> Self {
        let nav = NavigationState::new(&grid);
        log::debug!(
            "new session: {}x{} grid, seed {}, facing {}",
            grid.side(),
            grid.side(),
            seed,
            nav.heading().as_str()
        );
        Self {
            size: normalize_maze_size(grid.side() - 1),
            seed,
            grid,
            nav,
            steps: 0,
            finished: false,
        }
    }

    pub fn apply(&mut self, action: NavAction) -> ActionOutcome {
        let changed = match action {
            NavAction::TurnLeft => {
                self.nav.turn_left();
                true
            }
            NavAction::TurnRight => {
                self.nav.turn_right();
                true
            }
            NavAction::StepForward => self.nav.step_forward(&self.grid),
            NavAction::StepBackward => self.nav.step_backward(&self.grid),
            NavAction::ToggleView => {
                self.nav.toggle_view();
                true
            }
        };

        if changed && action.is_step() {
            self.steps = self.steps.saturating_add(1);
        }

        let at_finish = self.nav.at_finish(&self.grid);
        if at_finish && !self.finished {
            self.finished = true;
            log::info!("maze of size {} solved in {} steps", self.size, self.steps);
        }

        ActionOutcome {
            action,
            changed,
            at_finish,
        }
    }

    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Successful steps taken so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Whether the finish has been reached at least once.
    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let position = self.nav.position();
        SessionSnapshot {
            size: self.size,
            seed: self.seed,
            side: self.grid.side(),
            row: position.row,
            col: position.col,
            heading: self.nav.heading(),
            view: self.nav.view(),
            at_finish: self.nav.at_finish(&self.grid),
            finished: self.finished,
            steps: self.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::WallLayout;
    use crate::types::{Direction, ViewMode};

    fn open_session() -> MazeSession {
        let grid = MazeGrid::from_layout(4, &WallLayout::open(2)).unwrap();
        MazeSession::from_grid(grid, 0)
    }

    #[test]
    fn turns_always_change() {
        let mut s = open_session();
        let out = s.apply(NavAction::TurnRight);
        assert!(out.changed);
        assert_eq!(s.nav().heading(), Direction::Left);
        assert_eq!(s.steps(), 0);
    }

    #[test]
    fn blocked_step_is_reported() {
        let mut s = open_session();
        assert!(s.apply(NavAction::StepForward).changed);
        let out = s.apply(NavAction::StepForward);
        assert!(!out.changed);
        assert_eq!(s.steps(), 1);
    }

    #[test]
    fn finish_is_sticky() {
        let mut s = open_session();
        s.apply(NavAction::StepForward);
        s.apply(NavAction::TurnLeft);
        let out = s.apply(NavAction::StepForward);
        assert!(out.at_finish);
        assert!(s.finished());
        let out = s.apply(NavAction::StepBackward);
        assert!(out.changed);
        assert!(!out.at_finish);
        assert!(s.finished());
    }

    #[test]
    fn toggle_view_is_tracked_in_snapshot() {
        let mut s = open_session();
        s.apply(NavAction::ToggleView);
        let snap = s.snapshot();
        assert_eq!(snap.view, ViewMode::Map);
        assert_eq!((snap.row, snap.col), (1, 1));
        assert_eq!(snap.size, 4);
        assert_eq!(snap.side, 5);
    }

    #[test]
    fn generated_sessions_are_reproducible() {
        let a = MazeSession::new(20, 77).unwrap();
        let b = MazeSession::new(20, 77).unwrap();
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.nav(), b.nav());
    }

    #[test]
    fn invalid_size_is_rejected() {
        assert!(matches!(
            MazeSession::new(2, 1),
            Err(GridError::TooSmall { .. })
        ));
    }
}
