//! Frame encoding: raster -> PNG/JPEG bytes -> base64.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, ImageFormat, Rgb};
use thiserror::Error;

use crate::engine::Raster;
use crate::protocol::FrameFormat;

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot encode an empty {width}x{height} frame")]
    EmptyFrame { width: u32, height: u32 },

    #[error("pixel buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEncoder {
    format: FrameFormat,
    jpeg_quality: u8,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(FrameFormat::Png)
    }
}

impl FrameEncoder {
    pub fn new(format: FrameFormat) -> Self {
        Self {
            format,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Quality is clamped to 1..=100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Same settings, different format.
    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    pub fn encode(&self, raster: &Raster) -> Result<Vec<u8>, EncodeError> {
        let (width, height) = (raster.width(), raster.height());
        if width == 0 || height == 0 {
            return Err(EncodeError::EmptyFrame { width, height });
        }
        let img = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, raster.to_rgb8())
            .ok_or(EncodeError::BufferSize { width, height })?;

        let mut cursor = Cursor::new(Vec::with_capacity((width * height) as usize / 4));
        match self.format {
            FrameFormat::Png => img.write_to(&mut cursor, ImageFormat::Png)?,
            FrameFormat::Jpeg => {
                JpegEncoder::new_with_quality(&mut cursor, self.jpeg_quality).encode_image(&img)?
            }
        }
        Ok(cursor.into_inner())
    }

    pub fn encode_base64(&self, raster: &Raster) -> Result<String, EncodeError> {
        let bytes = self.encode(raster)?;
        Ok(general_purpose::STANDARD.encode(bytes))
    }
}
