//! Grid module - immutable maze topology
//!
//! The maze is stored at doubled resolution in one dense boolean array:
//! `(odd, odd)` positions are nodes (maze cells), positions with exactly one
//! even coordinate are passages between two nodes, and `(even, even)`
//! positions are pillars that are always walls. Whether two adjacent nodes are
//! connected is answered by reading the single passage cell between them.
//!
//! Coordinates: `(row, col)`, both ranging `0..side`. Start is `(1, 1)` and
//! finish is `(side - 2, side - 2)`. The outer ring is always a wall.

use thiserror::Error;

use crate::generator::{MazeGenerator, WallLayout};
use crate::types::{normalize_maze_size, Direction, NodeRole, MIN_MAZE_SIZE};

/// A position on the doubled-resolution grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Node {
    pub row: usize,
    pub col: usize,
}

impl Node {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Both coordinates odd.
    pub fn is_node_index(&self) -> bool {
        self.row % 2 == 1 && self.col % 2 == 1
    }

    /// Move `cells` grid cells in `dir`; None when that would go below zero.
    pub fn offset(&self, dir: Direction, cells: usize) -> Option<Node> {
        let (dr, dc) = dir.delta();
        let row = self.row.checked_add_signed(dr * cells as isize)?;
        let col = self.col.checked_add_signed(dc * cells as isize)?;
        Some(Node { row, col })
    }
}

/// Malformed generator output. Fatal for session creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("maze size {requested} is below the minimum of {min}")]
    TooSmall { requested: usize, min: usize },

    #[error("generator produced a layout of side {side} with {cells} cells, expected side {expected}")]
    DimensionMismatch {
        expected: usize,
        side: usize,
        cells: usize,
    },

    #[error("generator opened the outer border at ({row}, {col})")]
    OpenBorder { row: usize, col: usize },

    #[error("{role:?} node ({row}, {col}) is not passable")]
    ClosedEndpoint { role: NodeRole, row: usize, col: usize },
}

/// Immutable maze topology with fixed start and finish nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    side: usize,
    /// Row-major open flags (`true` = traversable).
    cells: Vec<bool>,
    start: Node,
    finish: Node,
}

impl MazeGrid {
    /// Build the grid for requested size `size` from a generator's layout.
    ///
    /// `size` is rounded down to even; the layout must be `size/2` cells wide.
    pub fn from_layout(size: usize, layout: &WallLayout) -> Result<Self, GridError> {
        let size = Self::checked_size(size)?;
        let logical = size / 2;
        if layout.side != logical || layout.cells.len() != logical * logical {
            return Err(GridError::DimensionMismatch {
                expected: logical,
                side: layout.side,
                cells: layout.cells.len(),
            });
        }

        let side = size + 1;
        let mut cells = vec![false; side * side];
        for i in 0..logical {
            for j in 0..logical {
                let wall = layout.cells[i * logical + j];
                let (row, col) = (2 * i + 1, 2 * j + 1);

                cells[row * side + col] = true;

                if !wall.left {
                    if j == 0 {
                        return Err(GridError::OpenBorder { row, col: 0 });
                    }
                    cells[row * side + col - 1] = true;
                }
                if !wall.top {
                    if i == 0 {
                        return Err(GridError::OpenBorder { row: 0, col });
                    }
                    cells[(row - 1) * side + col] = true;
                }
            }
        }

        let grid = Self {
            side,
            cells,
            start: Node::new(1, 1),
            finish: Node::new(side - 2, side - 2),
        };

        for (role, node) in [(NodeRole::Start, grid.start), (NodeRole::Finish, grid.finish)] {
            if !grid.node_open(node) {
                return Err(GridError::ClosedEndpoint {
                    role,
                    row: node.row,
                    col: node.col,
                });
            }
        }

        log::debug!("built {}x{} maze grid", side, side);
        Ok(grid)
    }

    /// Run `generator` for the requested size and build the grid from its output.
    pub fn generate(size: usize, generator: &mut impl MazeGenerator) -> Result<Self, GridError> {
        let size = Self::checked_size(size)?;
        let layout = generator.generate(size / 2);
        Self::from_layout(size, &layout)
    }

    fn checked_size(size: usize) -> Result<usize, GridError> {
        let normalized = normalize_maze_size(size);
        if normalized < MIN_MAZE_SIZE {
            return Err(GridError::TooSmall {
                requested: size,
                min: MIN_MAZE_SIZE,
            });
        }
        Ok(normalized)
    }

    /// Side of the boolean grid (odd, >= 5).
    pub fn side(&self) -> usize {
        self.side
    }

    /// Side of the logical maze (number of nodes per row).
    pub fn logical_side(&self) -> usize {
        self.side / 2
    }

    pub fn start(&self) -> Node {
        self.start
    }

    pub fn finish(&self) -> Node {
        self.finish
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.side || col >= self.side {
            return None;
        }
        Some(row * self.side + col)
    }

    /// Raw open flag; false when out of bounds.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.index(row, col).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// Open flag of a node position; false for non-node positions.
    pub fn node_open(&self, node: Node) -> bool {
        node.is_node_index() && self.is_open(node.row, node.col)
    }

    /// Open flag of a passage position; false for nodes and pillars.
    pub fn passage_open(&self, row: usize, col: usize) -> bool {
        (row % 2 == 1) != (col % 2 == 1) && self.is_open(row, col)
    }

    /// Whether the passage next to `node` in direction `dir` is open.
    pub fn passable(&self, node: Node, dir: Direction) -> bool {
        match node.offset(dir, 1) {
            Some(p) => self.passage_open(p.row, p.col),
            None => false,
        }
    }

    /// The node one step away in `dir`, if the passage towards it is open.
    pub fn neighbor(&self, node: Node, dir: Direction) -> Option<Node> {
        if !self.passable(node, dir) {
            return None;
        }
        node.offset(dir, 2).filter(|n| self.node_open(*n))
    }

    pub fn role(&self, node: Node) -> NodeRole {
        if node == self.start {
            NodeRole::Start
        } else if node == self.finish {
            NodeRole::Finish
        } else {
            NodeRole::Regular
        }
    }

    /// Iterate rows of open flags (for map rendering and debugging).
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.side)
    }

    /// Text dump: `#` wall, ` ` open, `S`/`F` endpoints.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.side * (self.side + 1));
        for (row, cells) in self.rows().enumerate() {
            for (col, &open) in cells.iter().enumerate() {
                let ch = match (open, self.role(Node::new(row, col))) {
                    (false, _) => '#',
                    (true, NodeRole::Start) => 'S',
                    (true, NodeRole::Finish) => 'F',
                    (true, NodeRole::Regular) => ' ',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{KruskalGenerator, WallCell};

    #[test]
    fn open_layout_builds_expected_grid() {
        let grid = MazeGrid::from_layout(4, &WallLayout::open(2)).unwrap();
        assert_eq!(grid.side(), 5);
        assert_eq!(
            grid.to_ascii(),
            "#####\n\
             #S  #\n\
             # # #\n\
             #  F#\n\
             #####\n"
        );
    }

    #[test]
    fn pillars_stay_walls() {
        let grid = MazeGrid::from_layout(4, &WallLayout::open(2)).unwrap();
        // Centre pillar between the four nodes is never opened by a layout.
        assert!(!grid.is_open(2, 2));
        assert!(!grid.passage_open(2, 2));
        assert!(!grid.passage_open(1, 1));
        assert!(grid.passage_open(1, 2));
    }

    #[test]
    fn odd_size_rounds_down() {
        let grid = MazeGrid::from_layout(5, &WallLayout::open(2)).unwrap();
        assert_eq!(grid.side(), 5);
        assert_eq!(grid.finish(), Node::new(3, 3));
    }

    #[test]
    fn rejects_too_small() {
        let err = MazeGrid::from_layout(3, &WallLayout::open(1)).unwrap_err();
        assert_eq!(err, GridError::TooSmall { requested: 3, min: 4 });
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let err = MazeGrid::from_layout(10, &WallLayout::open(4)).unwrap_err();
        assert!(matches!(err, GridError::DimensionMismatch { expected: 5, side: 4, .. }));

        let mut short = WallLayout::open(5);
        short.cells.pop();
        assert!(matches!(
            MazeGrid::from_layout(10, &short),
            Err(GridError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn rejects_open_border() {
        let mut layout = WallLayout::open(2);
        layout.set(1, 0, WallCell { left: false, top: false });
        assert_eq!(
            MazeGrid::from_layout(4, &layout).unwrap_err(),
            GridError::OpenBorder { row: 3, col: 0 }
        );

        let mut layout = WallLayout::open(2);
        layout.set(0, 1, WallCell { left: false, top: false });
        assert_eq!(
            MazeGrid::from_layout(4, &layout).unwrap_err(),
            GridError::OpenBorder { row: 0, col: 3 }
        );
    }

    #[test]
    fn passable_is_bounds_checked() {
        let grid = MazeGrid::from_layout(4, &WallLayout::open(2)).unwrap();
        // Misuse: query from a node on the edge of the array.
        assert!(!grid.passable(Node::new(0, 0), Direction::Up));
        assert!(!grid.passable(Node::new(0, 0), Direction::Left));
        assert!(!grid.passable(Node::new(4, 4), Direction::Down));
        assert!(!grid.passable(Node::new(100, 100), Direction::Right));
    }

    #[test]
    fn neighbor_follows_open_passages() {
        let grid = MazeGrid::from_layout(4, &WallLayout::open(2)).unwrap();
        let start = grid.start();
        assert_eq!(grid.neighbor(start, Direction::Down), Some(Node::new(3, 1)));
        assert_eq!(grid.neighbor(start, Direction::Right), Some(Node::new(1, 3)));
        assert_eq!(grid.neighbor(start, Direction::Up), None);
        assert_eq!(grid.neighbor(start, Direction::Left), None);
    }

    #[test]
    fn roles() {
        let grid = MazeGrid::from_layout(6, &WallLayout::open(3)).unwrap();
        assert_eq!(grid.role(Node::new(1, 1)), NodeRole::Start);
        assert_eq!(grid.role(Node::new(5, 5)), NodeRole::Finish);
        assert_eq!(grid.role(Node::new(3, 3)), NodeRole::Regular);
    }

    #[test]
    fn generated_grid_border_is_wall() {
        let grid = MazeGrid::generate(20, &mut KruskalGenerator::new(3)).unwrap();
        let side = grid.side();
        assert_eq!(side, 21);
        for i in 0..side {
            assert!(!grid.is_open(0, i));
            assert!(!grid.is_open(side - 1, i));
            assert!(!grid.is_open(i, 0));
            assert!(!grid.is_open(i, side - 1));
        }
    }
}
