//! Core maze logic - pure, deterministic, and testable
//!
//! This crate contains the maze topology, the navigation state machine and the
//! per-player session. It has **no dependencies** on rendering, terminals or
//! networking:
//!
//! - **Deterministic**: the same seed produces the same maze
//! - **Total**: illegal moves are `false`, never errors or panics
//! - **Isolated**: no global state; every session owns its grid and viewer
//!
//! # Module Structure
//!
//! - [`generator`]: wall layouts and the default Kruskal generator
//! - [`grid`]: doubled-resolution passability grid with fixed start/finish
//! - [`nav`]: position, heading and display mode with move legality
//! - [`rng`]: seeded LCG feeding the generator
//! - [`session`]: one grid plus one viewer, driven by [`NavAction`](types::NavAction)s
//! - [`snapshot`]: copyable session summary for hosts
//!
//! # Example
//!
//! ```
//! use mazewalk_core::{MazeGrid, NavigationState, WallLayout};
//! use mazewalk_types::Direction;
//!
//! // 2x2 logical maze with every interior wall removed.
//! let grid = MazeGrid::from_layout(4, &WallLayout::open(2)).unwrap();
//! let mut nav = NavigationState::new(&grid);
//!
//! assert_eq!(nav.heading(), Direction::Down);
//! assert!(nav.step_forward(&grid));
//! assert_eq!((nav.position().row, nav.position().col), (3, 1));
//! assert!(!nav.step_forward(&grid)); // border ahead
//! ```

pub mod generator;
pub mod grid;
pub mod nav;
pub mod rng;
pub mod session;
pub mod snapshot;

pub use mazewalk_types as types;

// Re-export commonly used types for convenience
pub use generator::{KruskalGenerator, MazeGenerator, WallCell, WallLayout};
pub use grid::{GridError, MazeGrid, Node};
pub use nav::NavigationState;
pub use rng::SimpleRng;
pub use session::{ActionOutcome, MazeSession};
pub use snapshot::SessionSnapshot;
