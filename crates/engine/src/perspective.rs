//! First-person corridor renderer.
//!
//! The view looks straight down the corridor in front of the viewer. Each
//! node along it is a slice between two depths; depth `d` spans from
//! `half / (d - 0.5)` (near edge) to `half / (d + 0.5)` (far edge) pixels off
//! the frame centre. Depth 1 is the viewer's own node.
//!
//! Painting runs back to front: the wall that ends the corridor first, then
//! every slice from the farthest to the nearest, so nearer surfaces overdraw
//! farther ones.

use arrayvec::ArrayVec;

use crate::core::{MazeGrid, NavigationState, Node};
use crate::raster::{Point, Raster};
use crate::types::{ColorScheme, Direction, Material, NodeRole, BORDER_WIDTH};

/// How far the viewer can see down the current heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorridorScan {
    /// Open passages crossed before the blocking wall.
    pub open_steps: u32,
    /// Number of slices to draw (`open_steps + 1`).
    pub depth: u32,
    /// Last reachable node; the wall ahead of it ends the corridor.
    pub end: Node,
}

/// Walk from `from` along `heading` until a wall blocks the way.
///
/// Side openings do not stop the scan; they are drawn as branches.
pub fn scan_corridor(grid: &MazeGrid, from: Node, heading: Direction) -> CorridorScan {
    let mut end = from;
    let mut open_steps = 0u32;
    while let Some(next) = grid.neighbor(end, heading) {
        end = next;
        open_steps += 1;
    }
    CorridorScan {
        open_steps,
        depth: open_steps + 1,
        end,
    }
}

/// Left or right of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Horizontal sign on screen.
    fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Grid direction this side points to for a viewer facing `heading`.
    pub fn direction(self, heading: Direction) -> Direction {
        match self {
            Side::Left => heading.turn_left(),
            Side::Right => heading.turn_right(),
        }
    }
}

/// Polygon classes of one corridor slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Wall facing the viewer at the far edge of a slice.
    FrontWall,
    /// Solid side wall running from the near to the far edge.
    SideWall(Side),
    /// Strip of wall left visible beside a side opening.
    SideStub(Side),
    Ceiling,
    Floor,
    /// Ceiling triangle above a side opening.
    CeilingWedge(Side),
    /// Floor triangle below a side opening.
    FloorWedge(Side),
}

impl Surface {
    pub fn material(self) -> Material {
        match self {
            Surface::FrontWall | Surface::SideWall(_) | Surface::SideStub(_) => Material::Wall,
            Surface::Ceiling | Surface::CeilingWedge(_) => Material::Ceiling,
            Surface::Floor | Surface::FloorWedge(_) => Material::Floor,
        }
    }

    /// Screen polygon at `depth` (>= 1) for a frame whose centre is `(half, half)`.
    pub fn polygon(self, depth: u32, half: f32) -> ArrayVec<Point, 4> {
        let d = depth.max(1) as f32;
        let far = half / (d + 0.5);
        let near = half / (d - 0.5);
        let p = |dx: f32, dy: f32| Point::new(half + dx, half + dy);

        let mut out = ArrayVec::new();
        match self {
            Surface::FrontWall => {
                out.extend([p(far, far), p(far, -far), p(-far, -far), p(-far, far)]);
            }
            Surface::SideWall(side) => {
                let s = side.sign();
                out.extend([
                    p(s * far, far),
                    p(s * far, -far),
                    p(s * near, -near),
                    p(s * near, near),
                ]);
            }
            Surface::SideStub(side) => {
                let s = side.sign();
                out.extend([
                    p(s * far, far),
                    p(s * far, -far),
                    p(s * near, -far),
                    p(s * near, far),
                ]);
            }
            Surface::Ceiling => {
                out.extend([p(far, -far), p(near, -near), p(-near, -near), p(-far, -far)]);
            }
            Surface::Floor => {
                out.extend([p(far, far), p(near, near), p(-near, near), p(-far, far)]);
            }
            Surface::CeilingWedge(side) => {
                let s = side.sign();
                out.extend([p(s * near, -far), p(s * far, -far), p(s * near, -near)]);
            }
            Surface::FloorWedge(side) => {
                let s = side.sign();
                out.extend([p(s * near, far), p(s * far, far), p(s * near, near)]);
            }
        }
        out
    }
}

/// Renders the first-person view into a square raster.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveRenderer {
    frame_size: u32,
}

impl PerspectiveRenderer {
    pub fn new(frame_size: u32) -> Self {
        Self { frame_size }
    }

    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }

    pub fn render(&self, grid: &MazeGrid, nav: &NavigationState, scheme: &ColorScheme) -> Raster {
        let mut raster = Raster::new(self.frame_size, self.frame_size, scheme.background);
        self.render_into(grid, nav, scheme, &mut raster);
        raster
    }

    /// Render into an existing raster, resizing it to the frame size.
    pub fn render_into(
        &self,
        grid: &MazeGrid,
        nav: &NavigationState,
        scheme: &ColorScheme,
        raster: &mut Raster,
    ) {
        raster.reset(self.frame_size, self.frame_size, scheme.background);
        let half = self.frame_size as f32 / 2.0;
        let heading = nav.heading();
        let scan = scan_corridor(grid, nav.position(), heading);
        log::trace!(
            "perspective from ({}, {}) facing {}: depth {}",
            nav.position().row,
            nav.position().col,
            heading.as_str(),
            scan.depth
        );

        let mut draw = |surface: Surface, depth: u32, role: NodeRole| {
            let paint = scheme.paint(surface.material(), role);
            let polygon = surface.polygon(depth, half);
            raster.fill_polygon(&polygon, paint.surface);
            raster.stroke_polygon(&polygon, BORDER_WIDTH, paint.border);
        };

        draw(Surface::FrontWall, scan.depth, grid.role(scan.end));

        let mut node = scan.end;
        for depth in (1..=scan.depth).rev() {
            for side in Side::BOTH {
                match grid.neighbor(node, side.direction(heading)) {
                    Some(branch) => {
                        let role = grid.role(branch);
                        draw(Surface::SideStub(side), depth, NodeRole::Regular);
                        draw(Surface::CeilingWedge(side), depth, role);
                        draw(Surface::FloorWedge(side), depth, role);
                    }
                    None => draw(Surface::SideWall(side), depth, NodeRole::Regular),
                }
            }

            let role = grid.role(node);
            draw(Surface::Ceiling, depth, role);
            draw(Surface::Floor, depth, role);

            if depth > 1 {
                node = node.offset(heading.opposite(), 2).unwrap_or(node);
            }
        }
    }
}
