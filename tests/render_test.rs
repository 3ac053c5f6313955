//! Rendering tests - first-person and map views of whole sessions

use mazewalk::core::{MazeGrid, MazeSession, NavigationState, Node, WallCell, WallLayout};
use mazewalk::engine::{scan_corridor, FrameRenderer, MapRenderer, PerspectiveRenderer, Raster};
use mazewalk::types::{ColorScheme, Direction, NavAction, Rgb};

const FRAME: u32 = 200;

/// 5x5 maze whose top row is a five-node corridor; the rest is sealed off.
fn corridor_grid() -> MazeGrid {
    let mut layout = WallLayout::closed(5);
    for col in 1..5 {
        layout.set(0, col, WallCell { left: false, top: true });
    }
    MazeGrid::from_layout(10, &layout).unwrap()
}

/// Run of `color` on the centre row, walking outwards from the centre.
fn centre_run(raster: &Raster, color: Rgb) -> u32 {
    let c = raster.width() / 2;
    let mut x = c;
    while x < raster.width() && raster.get(x, c) == Some(color) {
        x += 1;
    }
    x - c
}

#[test]
fn test_corridor_depth_decreases_per_step() {
    let grid = corridor_grid();
    let scheme = ColorScheme::default();
    let renderer = PerspectiveRenderer::new(FRAME);
    let mut nav = NavigationState::new(&grid);
    assert_eq!(nav.heading(), Direction::Right);

    let mut depths = Vec::new();
    let mut runs = Vec::new();
    loop {
        depths.push(scan_corridor(&grid, nav.position(), nav.heading()).depth);
        let frame = renderer.render(&grid, &nav, &scheme);
        runs.push(centre_run(&frame, scheme.wall.surface));
        if !nav.step_forward(&grid) {
            break;
        }
    }

    assert_eq!(depths, vec![5, 4, 3, 2, 1]);
    // The end wall grows as the viewer approaches it.
    assert!(runs.windows(2).all(|w| w[0] < w[1]), "runs: {:?}", runs);
}

#[test]
fn test_facing_a_wall_fills_the_centre() {
    let grid = corridor_grid();
    let scheme = ColorScheme::default();
    let nav = NavigationState::at(&grid, Node::new(1, 5), Direction::Down).unwrap();
    let frame = PerspectiveRenderer::new(FRAME).render(&grid, &nav, &scheme);

    let c = FRAME / 2;
    assert_eq!(frame.get(c, c), Some(scheme.wall.surface));
    assert_eq!(frame.get(c, 2), Some(scheme.ceiling.surface));
    assert_eq!(frame.get(c, FRAME - 3), Some(scheme.floor.surface));
}

#[test]
fn test_wall_ending_at_start_is_highlighted() {
    let grid = corridor_grid();
    let scheme = ColorScheme::default();
    let nav = NavigationState::at(&grid, grid.start(), Direction::Down).unwrap();
    let frame = PerspectiveRenderer::new(FRAME).render(&grid, &nav, &scheme);

    let c = FRAME / 2;
    assert_eq!(frame.get(c, c), Some(scheme.start.surface));
    assert_eq!(frame.get(c, 2), Some(scheme.start.surface));
}

#[test]
fn test_renders_are_deterministic() {
    let scheme = ColorScheme::default();
    let renderer = FrameRenderer::new(128, scheme);
    let mut a = MazeSession::new(20, 2024).unwrap();
    let mut b = MazeSession::new(20, 2024).unwrap();

    for action in [
        NavAction::StepForward,
        NavAction::TurnLeft,
        NavAction::StepForward,
        NavAction::ToggleView,
        NavAction::TurnRight,
    ] {
        a.apply(action);
        b.apply(action);
        let fa = renderer.render_session(&a);
        let fb = renderer.render_session(&b);
        assert_eq!(fa.checksum(), fb.checksum());
        assert_eq!(fa, fb);
    }
}

#[test]
fn test_map_marks_start_and_finish() {
    let session = MazeSession::new(10, 17).unwrap();
    let scheme = ColorScheme::default();
    let map = MapRenderer::new(220);
    let frame = map.render(session.grid(), session.nav(), &scheme);

    // 11x11 cells of 20 px. Finish is cell (9, 9).
    assert_eq!(map.cell_size(session.grid()), 20.0);
    assert_eq!(frame.get(9 * 20 + 10, 9 * 20 + 10), Some(scheme.finish.surface));
    assert_eq!(frame.get(10, 10), Some(scheme.wall.surface));
    assert!(frame.count(scheme.start.surface) > 0);
    assert!(frame.count(scheme.ceiling.surface) > 0);
}

#[test]
fn test_map_ignores_heading_except_marker() {
    let grid = corridor_grid();
    let scheme = ColorScheme::default();
    let map = MapRenderer::new(110);
    let right = NavigationState::at(&grid, grid.start(), Direction::Right).unwrap();
    let down = NavigationState::at(&grid, grid.start(), Direction::Down).unwrap();
    let a = map.render(&grid, &right, &scheme);
    let b = map.render(&grid, &down, &scheme);

    assert_ne!(a.checksum(), b.checksum());
    // Far corner is untouched by the marker.
    assert_eq!(a.get(105, 105), b.get(105, 105));
    assert_eq!(a.count(scheme.finish.surface), b.count(scheme.finish.surface));
}

#[test]
fn test_frame_renderer_uses_configured_size() {
    let session = MazeSession::new(50, 3).unwrap();
    let frame = FrameRenderer::new(64, ColorScheme::default()).render_session(&session);
    assert_eq!((frame.width(), frame.height()), (64, 64));
    assert_eq!(frame.to_rgb8().len(), 64 * 64 * 3);
}
