//! MazeView: maps a rendered frame plus session state into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::SessionSnapshot;
use crate::engine::Raster;
use crate::fb::{Cell, CellStyle, FrameBuffer};
use crate::types::Rgb;

/// Rows reserved below the picture: status and key help.
pub const STATUS_ROWS: u16 = 2;

const HELP: &str = "arrows/wasd move  m map  1/2/3 new 10/20/50  n new maze  q quit";

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MazeView;

impl MazeView {
    pub fn new() -> Self {
        Self
    }

    /// Side in pixels of the square picture that fits the viewport.
    ///
    /// A cell holds one pixel across and two down, so the picture is
    /// `side` columns wide and `side / 2` rows tall. Always even.
    pub fn picture_side(&self, viewport: Viewport) -> u16 {
        let rows = viewport.height.saturating_sub(STATUS_ROWS);
        viewport.width.min(rows.saturating_mul(2)) & !1
    }

    /// Render into an existing framebuffer.
    ///
    /// `frame` is sampled nearest-neighbour, so any frame size works; it is
    /// sharpest when rendered at [`picture_side`](Self::picture_side).
    pub fn render_into(
        &self,
        frame: &Raster,
        snap: &SessionSnapshot,
        notice: Option<&str>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Cell::default());

        let side = self.picture_side(viewport);
        let start_x = (viewport.width - side) / 2;
        if side > 0 && frame.width() > 0 && frame.height() > 0 {
            for cy in 0..side / 2 {
                for cx in 0..side {
                    let top = sample(frame, cx, cy * 2, side);
                    let bottom = sample(frame, cx, cy * 2 + 1, side);
                    fb.put_pixels(start_x + cx, cy, top, bottom);
                }
            }
        }

        let status_y = viewport.height.saturating_sub(STATUS_ROWS);
        self.draw_status(fb, snap, notice, status_y);
        fb.put_str(0, status_y + 1, HELP, dim_style());

        if snap.at_finish {
            let text = " FINISH! press n for a new maze ";
            let w = text.chars().count() as u16;
            let x = start_x + side.saturating_sub(w) / 2;
            let y = side / 4;
            let banner = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(255, 20, 147)).bold();
            fb.put_str(x, y, text, banner);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        frame: &Raster,
        snap: &SessionSnapshot,
        notice: Option<&str>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(frame, snap, notice, viewport, &mut fb);
        fb
    }

    fn draw_status(&self, fb: &mut FrameBuffer, snap: &SessionSnapshot, notice: Option<&str>, y: u16) {
        let bar = CellStyle::new(Rgb::new(230, 230, 230), Rgb::new(40, 40, 60));
        fb.fill_row(y, bar);

        let logical = snap.side / 2;
        let line = format!(
            " {}x{} seed {} | node ({}, {}) facing {} | {} | steps {}",
            logical,
            logical,
            snap.seed,
            snap.row / 2,
            snap.col / 2,
            snap.heading.as_str(),
            snap.view.as_str(),
            snap.steps
        );
        let mut x = fb.put_str(0, y, &line, bar);
        if let Some(notice) = notice {
            x = fb.put_str(x, y, " | ", bar);
            fb.put_str(x, y, notice, bar.bold());
        }
    }
}

fn dim_style() -> CellStyle {
    CellStyle::new(Rgb::new(140, 140, 150), Rgb::new(0, 0, 0))
}

fn sample(frame: &Raster, x: u16, y: u16, side: u16) -> Rgb {
    let fx = (x as u64 * frame.width() as u64 / side as u64) as u32;
    let fy = (y as u64 * frame.height() as u64 / side as u64) as u32;
    frame.get(fx, fy).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MazeSession;
    use crate::engine::render_session;
    use crate::fb::HALF_BLOCK;
    use crate::types::ColorScheme;

    #[test]
    fn picture_fits_viewport() {
        let view = MazeView::new();
        assert_eq!(view.picture_side(Viewport::new(80, 24)), 44);
        assert_eq!(view.picture_side(Viewport::new(30, 24)), 30);
        assert_eq!(view.picture_side(Viewport::new(31, 100)), 30);
        assert_eq!(view.picture_side(Viewport::new(80, 1)), 0);
    }

    #[test]
    fn renders_picture_and_status() {
        let session = MazeSession::new(10, 7).unwrap();
        let vp = Viewport::new(60, 24);
        let side = MazeView::new().picture_side(vp);
        let frame = render_session(&session, &ColorScheme::default(), side as u32);
        let fb = MazeView::new().render(&frame, &session.snapshot(), Some("blocked"), vp);

        let start_x = (60 - side) / 2;
        let cell = fb.get(start_x, 0).unwrap();
        assert_eq!(cell.ch, HALF_BLOCK);
        assert_eq!(cell.style.fg, frame.get(0, 0).unwrap());
        assert_eq!(cell.style.bg, frame.get(0, 1).unwrap());

        let status = fb.row_text(22);
        assert!(status.contains("5x5 seed 7"));
        assert!(status.contains("facing"));
        assert!(status.contains("blocked"));
        assert!(fb.row_text(23).contains("q quit"));
    }

    #[test]
    fn finish_shows_banner() {
        let session = MazeSession::new(10, 7).unwrap();
        let mut snap = session.snapshot();
        snap.at_finish = true;
        let frame = Raster::new(8, 8, Rgb::new(0, 0, 0));
        let fb = MazeView::new().render(&frame, &snap, None, Viewport::new(80, 24));
        assert!(fb.row_text(11).contains("FINISH!"));
    }
}
