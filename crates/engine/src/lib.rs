//! Rendering engine - maze state to pixels
//!
//! Two renderers share one raster type:
//!
//! - [`perspective`]: first-person corridor view
//! - [`map`]: top-down overview with a heading marker
//! - [`raster`]: RGB surface with polygon fill and stroked outlines
//!
//! [`FrameRenderer`] picks the renderer from the session's current view mode.
//! Rendering is pure: the same grid, viewer, scheme and frame size always
//! produce the same pixels.

pub mod map;
pub mod perspective;
pub mod raster;

pub use mazewalk_core as core;
pub use mazewalk_types as types;

pub use map::{heading_marker, MapRenderer};
pub use perspective::{scan_corridor, CorridorScan, PerspectiveRenderer, Side, Surface};
pub use raster::{Point, Raster};

use crate::core::{MazeGrid, MazeSession, NavigationState};
use crate::types::{ColorScheme, ViewMode};

/// Renders whichever view the viewer currently has selected.
#[derive(Debug, Clone, Copy)]
pub struct FrameRenderer {
    scheme: ColorScheme,
    perspective: PerspectiveRenderer,
    map: MapRenderer,
}

impl FrameRenderer {
    pub fn new(frame_size: u32, scheme: ColorScheme) -> Self {
        Self {
            scheme,
            perspective: PerspectiveRenderer::new(frame_size),
            map: MapRenderer::new(frame_size),
        }
    }

    pub fn frame_size(&self) -> u32 {
        self.perspective.frame_size()
    }

    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    pub fn render(&self, grid: &MazeGrid, nav: &NavigationState) -> Raster {
        let mut raster = Raster::new(0, 0, self.scheme.background);
        self.render_into(grid, nav, &mut raster);
        raster
    }

    pub fn render_into(&self, grid: &MazeGrid, nav: &NavigationState, raster: &mut Raster) {
        match nav.view() {
            ViewMode::FirstPerson => self.perspective.render_into(grid, nav, &self.scheme, raster),
            ViewMode::Map => self.map.render_into(grid, nav, &self.scheme, raster),
        }
    }

    pub fn render_session(&self, session: &MazeSession) -> Raster {
        self.render(session.grid(), session.nav())
    }
}

/// One-shot render of a session's current view.
pub fn render_session(session: &MazeSession, scheme: &ColorScheme, frame_size: u32) -> Raster {
    FrameRenderer::new(frame_size, *scheme).render_session(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NavAction;

    #[test]
    fn view_mode_selects_renderer() {
        let mut session = MazeSession::new(10, 99).unwrap();
        let renderer = FrameRenderer::new(96, ColorScheme::default());

        let first = renderer.render_session(&session);
        session.apply(NavAction::ToggleView);
        let map = renderer.render_session(&session);

        assert_eq!(first.width(), 96);
        assert_eq!(map.width(), 96);
        assert_ne!(first.checksum(), map.checksum());
        assert_eq!(
            map.checksum(),
            MapRenderer::new(96)
                .render(session.grid(), session.nav(), renderer.scheme())
                .checksum()
        );
    }

    #[test]
    fn one_shot_matches_renderer() {
        let session = MazeSession::new(20, 5).unwrap();
        let scheme = ColorScheme::default();
        assert_eq!(
            render_session(&session, &scheme, 64),
            FrameRenderer::new(64, scheme).render_session(&session)
        );
    }
}
