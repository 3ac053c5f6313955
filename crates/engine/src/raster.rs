//! Raster surface backed by a `tiny_skia::Pixmap`.
//!
//! Drawing is done without anti-aliasing so every pixel carries exactly one
//! of the scheme colours. Pixel `(x, y)` is covered by a shape when its centre
//! `(x + 0.5, y + 0.5)` lies inside it. Shapes may extend past the surface;
//! tiny-skia clips them.

use std::fmt;

use tiny_skia::{
    ColorU8, FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use crate::types::Rgb;

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

fn paint(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = false;
    paint
}

/// Closed path through `points`, or `None` when it encloses nothing.
fn polygon_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    if rest.len() < 2 {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

/// Fixed-size opaque RGB raster. A zero-sized raster holds no pixmap and
/// ignores every drawing call.
#[derive(Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    pixmap: Option<Pixmap>,
}

impl Raster {
    pub fn new(width: u32, height: u32, fill: Rgb) -> Self {
        let mut raster = Self {
            width,
            height,
            pixmap: Pixmap::new(width, height),
        };
        raster.clear(fill);
        raster
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize and clear, keeping the pixmap when the size is unchanged.
    pub fn reset(&mut self, width: u32, height: u32, fill: Rgb) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.pixmap = Pixmap::new(width, height);
        }
        self.clear(fill);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        let p = self.pixmap.as_ref()?.pixel(x, y)?;
        Some(Rgb::new(p.red(), p.green(), p.blue()))
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        if let Some(pixmap) = self.pixmap.as_mut() {
            let px = ColorU8::from_rgba(color.r, color.g, color.b, 255);
            pixmap.pixels_mut()[idx] = px.premultiply();
        }
    }

    pub fn clear(&mut self, color: Rgb) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, 255));
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let (Some(pixmap), Some(rect)) = (self.pixmap.as_mut(), Rect::from_xywh(x, y, w, h)) else {
            return;
        };
        pixmap.fill_rect(rect, &paint(color), Transform::identity(), None);
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, width: f32, color: Rgb) {
        let (Some(pixmap), Some(rect)) = (self.pixmap.as_mut(), Rect::from_xywh(x, y, w, h)) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    /// Even-odd fill. Fewer than three points draw nothing.
    pub fn fill_polygon(&mut self, points: &[Point], color: Rgb) {
        let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), polygon_path(points)) else {
            return;
        };
        pixmap.fill_path(
            &path,
            &paint(color),
            FillRule::EvenOdd,
            Transform::identity(),
            None,
        );
    }

    /// Closed outline of `width` pixels centred on the polygon edges.
    pub fn stroke_polygon(&mut self, points: &[Point], width: f32, color: Rgb) {
        let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), polygon_path(points)) else {
            return;
        };
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    /// Straight RGBA bytes of the pixmap. Every pixel is opaque, so the
    /// premultiplied data is already straight.
    fn rgba(&self) -> &[u8] {
        self.pixmap.as_ref().map(|p| p.data()).unwrap_or(&[])
    }

    /// Packed RGB8 bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let data = self.rgba();
        let mut out = Vec::with_capacity(data.len() / 4 * 3);
        for px in data.chunks_exact(4) {
            out.extend_from_slice(&px[..3]);
        }
        out
    }

    /// Stable 64-bit FNV-1a hash of the RGB pixel data.
    pub fn checksum(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
        const PRIME: u64 = 0x100000001b3;
        let mut state = OFFSET_BASIS;
        for px in self.rgba().chunks_exact(4) {
            for &b in &px[..3] {
                state ^= b as u64;
                state = state.wrapping_mul(PRIME);
            }
        }
        state
    }

    /// Number of pixels equal to `color`.
    pub fn count(&self, color: Rgb) -> usize {
        let want = [color.r, color.g, color.b];
        self.rgba()
            .chunks_exact(4)
            .filter(|px| px[..3] == want)
            .count()
    }
}

impl PartialEq for Raster {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.rgba() == other.rgba()
    }
}

impl Eq for Raster {}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("checksum", &format_args!("{:#018x}", self.checksum()))
            .finish()
    }
}
