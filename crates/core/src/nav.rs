//! Navigation module - viewer position, heading and display mode
//!
//! The state only ever rests on node positions. Moves are checked against the
//! grid's passages; a rejected move is reported as `false` and leaves the state
//! untouched.

use crate::grid::{MazeGrid, Node};
use crate::types::{Direction, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavigationState {
    position: Node,
    heading: Direction,
    view: ViewMode,
}

impl NavigationState {
    /// Place the viewer on the start node, facing the first open direction
    /// in the order down, right, left, up.
    pub fn new(grid: &MazeGrid) -> Self {
        let start = grid.start();
        let heading = Direction::START_PRIORITY
            .into_iter()
            .find(|&d| grid.passable(start, d))
            .unwrap_or(Direction::Down);

        Self {
            position: start,
            heading,
            view: ViewMode::FirstPerson,
        }
    }

    /// Place the viewer at an arbitrary node. None if `position` is not an open node.
    pub fn at(grid: &MazeGrid, position: Node, heading: Direction) -> Option<Self> {
        if !grid.node_open(position) {
            return None;
        }
        Some(Self {
            position,
            heading,
            view: ViewMode::FirstPerson,
        })
    }

    pub fn position(&self) -> Node {
        self.position
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn turn_left(&mut self) {
        self.heading = self.heading.turn_left();
    }

    pub fn turn_right(&mut self) {
        self.heading = self.heading.turn_right();
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggled();
    }

    /// Advance one node along the heading if the passage ahead is open.
    pub fn step_forward(&mut self, grid: &MazeGrid) -> bool {
        self.step(grid, self.heading)
    }

    /// Retreat one node against the heading, keeping the facing.
    pub fn step_backward(&mut self, grid: &MazeGrid) -> bool {
        self.step(grid, self.heading.opposite())
    }

    fn step(&mut self, grid: &MazeGrid, dir: Direction) -> bool {
        match grid.neighbor(self.position, dir) {
            Some(next) => {
                self.position = next;
                true
            }
            None => false,
        }
    }

    pub fn at_finish(&self, grid: &MazeGrid) -> bool {
        self.position == grid.finish()
    }
}
