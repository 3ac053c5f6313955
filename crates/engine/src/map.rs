//! Top-down map renderer.
//!
//! Every grid position becomes one square of `frame_size / side` pixels,
//! walls and open cells alike. The viewer is a triangle pointing along the
//! heading.

use crate::core::{MazeGrid, NavigationState, Node};
use crate::raster::{Point, Raster};
use crate::types::{ColorScheme, Direction, NodeRole, Paint, BORDER_WIDTH};

/// Heading marker for a cell whose top-left corner is `origin`, apex first.
pub fn heading_marker(heading: Direction, origin: Point, cell: f32) -> [Point; 3] {
    let (x, y, s) = (origin.x, origin.y, cell);
    match heading {
        Direction::Up => [
            Point::new(x + s / 2.0, y),
            Point::new(x, y + s),
            Point::new(x + s, y + s),
        ],
        Direction::Down => [
            Point::new(x + s / 2.0, y + s),
            Point::new(x, y),
            Point::new(x + s, y),
        ],
        Direction::Left => [
            Point::new(x, y + s / 2.0),
            Point::new(x + s, y),
            Point::new(x + s, y + s),
        ],
        Direction::Right => [
            Point::new(x + s, y + s / 2.0),
            Point::new(x, y),
            Point::new(x, y + s),
        ],
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MapRenderer {
    frame_size: u32,
}

impl MapRenderer {
    pub fn new(frame_size: u32) -> Self {
        Self { frame_size }
    }

    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }

    /// Side of one grid cell in pixels.
    pub fn cell_size(&self, grid: &MazeGrid) -> f32 {
        self.frame_size as f32 / grid.side() as f32
    }

    pub fn render(&self, grid: &MazeGrid, nav: &NavigationState, scheme: &ColorScheme) -> Raster {
        let mut raster = Raster::new(self.frame_size, self.frame_size, scheme.background);
        self.render_into(grid, nav, scheme, &mut raster);
        raster
    }

    pub fn render_into(
        &self,
        grid: &MazeGrid,
        nav: &NavigationState,
        scheme: &ColorScheme,
        raster: &mut Raster,
    ) {
        raster.reset(self.frame_size, self.frame_size, scheme.background);
        let s = self.cell_size(grid);

        for (row, cells) in grid.rows().enumerate() {
            for (col, &open) in cells.iter().enumerate() {
                let paint = cell_paint(scheme, open, grid.role(Node::new(row, col)));
                let (x, y) = (col as f32 * s, row as f32 * s);
                raster.fill_rect(x, y, s, s, paint.surface);
                raster.stroke_rect(x, y, s, s, BORDER_WIDTH, paint.border);
            }
        }

        let pos = nav.position();
        let origin = Point::new(pos.col as f32 * s, pos.row as f32 * s);
        let marker = heading_marker(nav.heading(), origin, s);
        raster.fill_polygon(&marker, scheme.ceiling.surface);
        raster.stroke_polygon(&marker, BORDER_WIDTH, scheme.ceiling.border);
    }
}

fn cell_paint(scheme: &ColorScheme, open: bool, role: NodeRole) -> Paint {
    match (open, role) {
        (false, _) => scheme.wall,
        (true, NodeRole::Start) => scheme.start,
        (true, NodeRole::Finish) => scheme.finish,
        (true, NodeRole::Regular) => scheme.floor,
    }
}
