use mazewalk::core::MazeSession;
use mazewalk::engine::FrameRenderer;
use mazewalk::term::{encode_diff_into, encode_full_into, FrameBuffer, MazeView, Viewport, HALF_BLOCK};
use mazewalk::types::{ColorScheme, NavAction};

fn draw(session: &MazeSession, vp: Viewport, notice: Option<&str>) -> FrameBuffer {
    let view = MazeView::new();
    let side = view.picture_side(vp) as u32;
    let frame = FrameRenderer::new(side, ColorScheme::default()).render_session(session);
    view.render(&frame, &session.snapshot(), notice, vp)
}

#[test]
fn term_view_centres_the_picture() {
    let session = MazeSession::new(10, 1).unwrap();
    let vp = Viewport::new(100, 30);
    let fb = draw(&session, vp, None);

    // 28 rows of picture -> 56 px; centred in 100 columns.
    assert_eq!(MazeView::new().picture_side(vp), 56);
    assert_eq!(fb.get(21, 0).unwrap().ch, ' ');
    assert_eq!(fb.get(22, 0).unwrap().ch, HALF_BLOCK);
    assert_eq!(fb.get(77, 27).unwrap().ch, HALF_BLOCK);
    assert_eq!(fb.get(78, 27).unwrap().ch, ' ');
}

#[test]
fn term_view_status_tracks_session() {
    let mut session = MazeSession::new(20, 11).unwrap();
    let vp = Viewport::new(90, 26);

    let fb = draw(&session, vp, None);
    let status = fb.row_text(24);
    assert!(status.contains("10x10 seed 11"), "status: {}", status);
    assert!(status.contains("node (0, 0)"));
    assert!(status.contains("| firstPerson |"));
    assert!(status.contains("steps 0"));

    session.apply(NavAction::ToggleView);
    let fb = draw(&session, vp, Some("blocked"));
    let status = fb.row_text(24);
    assert!(status.contains("| map |"));
    assert!(status.trim_end().ends_with("| blocked"));
}

#[test]
fn term_view_redraw_after_turn_is_a_diff() {
    let mut session = MazeSession::new(10, 3).unwrap();
    let vp = Viewport::new(40, 22);
    let before = draw(&session, vp, None);
    session.apply(NavAction::TurnLeft);
    let after = draw(&session, vp, None);
    assert_ne!(before, after);

    let mut full = Vec::new();
    encode_full_into(&after, &mut full).unwrap();
    let mut diff = Vec::new();
    encode_diff_into(&before, &after, &mut diff).unwrap();
    assert!(!full.is_empty());

    let mut none = Vec::new();
    encode_diff_into(&after, &after, &mut none).unwrap();
    assert!(none.len() < diff.len());
}
