//! Generator module - wall layouts consumed by [`MazeGrid`](crate::grid::MazeGrid)
//!
//! The grid only needs a square logical grid of cells, each telling whether it
//! has a wall on its left edge and on its top edge. Anything implementing
//! [`MazeGenerator`] can produce one; [`KruskalGenerator`] is the default.
//!
//! Kruskal's algorithm: every interior wall is an edge between two cells.
//! Edges are shuffled and a wall is knocked down whenever the two cells it
//! separates are not yet connected (tracked with a union-find). The result is
//! a perfect maze: every cell is reachable from every other through exactly
//! one path.

use crate::rng::SimpleRng;

/// Walls owned by one logical cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WallCell {
    /// Wall between this cell and its left neighbour (or the outer border).
    pub left: bool,
    /// Wall between this cell and the cell above (or the outer border).
    pub top: bool,
}

impl WallCell {
    pub const CLOSED: WallCell = WallCell {
        left: true,
        top: true,
    };
}

/// Square logical grid of wall flags, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallLayout {
    pub side: usize,
    pub cells: Vec<WallCell>,
}

impl WallLayout {
    /// Every cell fully walled in.
    pub fn closed(side: usize) -> Self {
        Self {
            side,
            cells: vec![WallCell::CLOSED; side * side],
        }
    }

    /// Only the outer border is walled; every interior wall is open.
    pub fn open(side: usize) -> Self {
        Self::from_fn(side, |row, col| WallCell {
            left: col == 0,
            top: row == 0,
        })
    }

    pub fn from_fn(side: usize, mut f: impl FnMut(usize, usize) -> WallCell) -> Self {
        let mut cells = Vec::with_capacity(side * side);
        for row in 0..side {
            for col in 0..side {
                cells.push(f(row, col));
            }
        }
        Self { side, cells }
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.side || col >= self.side {
            return None;
        }
        Some(row * self.side + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<WallCell> {
        self.index(row, col).and_then(|i| self.cells.get(i).copied())
    }

    /// Returns false if out of bounds
    pub fn set(&mut self, row: usize, col: usize, cell: WallCell) -> bool {
        match self.index(row, col).and_then(|i| self.cells.get_mut(i)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Number of removed interior walls.
    pub fn open_walls(&self) -> usize {
        let mut open = 0;
        for row in 0..self.side {
            for col in 0..self.side {
                if let Some(cell) = self.get(row, col) {
                    open += usize::from(col > 0 && !cell.left);
                    open += usize::from(row > 0 && !cell.top);
                }
            }
        }
        open
    }
}

/// Source of maze topology.
pub trait MazeGenerator {
    /// Produce a `side x side` layout with a walled outer border.
    fn generate(&mut self, side: usize) -> WallLayout;
}

/// Union-find over cell indices, with path halving and union by rank.
#[derive(Debug, Clone)]
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// Returns false if both were already in the same set.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// Interior wall between a cell and its right or lower neighbour.
#[derive(Debug, Clone, Copy)]
enum Edge {
    Right { row: usize, col: usize },
    Down { row: usize, col: usize },
}

/// Seeded Kruskal maze generator.
#[derive(Debug, Clone)]
pub struct KruskalGenerator {
    rng: SimpleRng,
}

impl KruskalGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }
}

impl MazeGenerator for KruskalGenerator {
    fn generate(&mut self, side: usize) -> WallLayout {
        let mut layout = WallLayout::closed(side);
        let mut sets = UnionFind::new(side * side);

        let mut edges = Vec::with_capacity(2 * side * side);
        for row in 0..side {
            for col in 0..side {
                if col + 1 < side {
                    edges.push(Edge::Right { row, col });
                }
                if row + 1 < side {
                    edges.push(Edge::Down { row, col });
                }
            }
        }
        self.rng.shuffle(&mut edges);

        for edge in edges {
            match edge {
                Edge::Right { row, col } => {
                    if sets.union(row * side + col, row * side + col + 1) {
                        layout.cells[row * side + col + 1].left = false;
                    }
                }
                Edge::Down { row, col } => {
                    if sets.union(row * side + col, (row + 1) * side + col) {
                        layout.cells[(row + 1) * side + col].top = false;
                    }
                }
            }
        }

        log::debug!(
            "generated {}x{} layout with {} open walls",
            side,
            side,
            layout.open_walls()
        );
        layout
    }
}
