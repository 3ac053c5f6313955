//! Host configuration: frame settings, session limits and colour files.
//!
//! Read from environment variables the same way as
//! [`ServerConfig::from_env`](crate::server::ServerConfig::from_env).
//! Binaries layer CLI flags on top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::encode::DEFAULT_JPEG_QUALITY;
use crate::protocol::FrameFormat;
use crate::types::{ColorScheme, Paint, Rgb, DEFAULT_FRAME_SIZE};

pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Smallest and largest frame sides the host will render.
pub const FRAME_SIZE_RANGE: (u32, u32) = (16, 4096);

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub frame_size: u32,
    pub format: FrameFormat,
    pub jpeg_quality: u8,
    pub max_sessions: usize,
    pub colors: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            format: FrameFormat::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_sessions: DEFAULT_MAX_SESSIONS,
            colors: None,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let frame_size = env::var("MAZEWALK_FRAME_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.frame_size);
        let format = env::var("MAZEWALK_FORMAT")
            .ok()
            .and_then(|s| FrameFormat::from_str(&s))
            .unwrap_or(defaults.format);
        let jpeg_quality = env::var("MAZEWALK_JPEG_QUALITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.jpeg_quality);
        let max_sessions = env::var("MAZEWALK_MAX_SESSIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_sessions);
        let colors = env::var("MAZEWALK_COLORS")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            frame_size,
            format,
            jpeg_quality,
            max_sessions,
            colors,
        }
        .clamped()
    }

    /// Pull out-of-range values back into range.
    pub fn clamped(mut self) -> Self {
        self.frame_size = self.frame_size.clamp(FRAME_SIZE_RANGE.0, FRAME_SIZE_RANGE.1);
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.max_sessions = self.max_sessions.max(1);
        self
    }

    /// The configured colour scheme, or the default when no file is set.
    pub fn color_scheme(&self) -> Result<ColorScheme> {
        match &self.colors {
            Some(path) => load_color_scheme(path),
            None => Ok(ColorScheme::default()),
        }
    }
}

/// On-disk colour scheme. Every field is optional; missing ones keep the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorFile {
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub wall: Option<PaintFile>,
    #[serde(default)]
    pub ceiling: Option<PaintFile>,
    #[serde(default)]
    pub floor: Option<PaintFile>,
    #[serde(default)]
    pub start: Option<PaintFile>,
    #[serde(default)]
    pub finish: Option<PaintFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaintFile {
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub border: Option<String>,
}

impl ColorFile {
    /// Overlay the file onto `base`.
    pub fn apply(&self, base: ColorScheme) -> Result<ColorScheme> {
        let mut scheme = base;
        if let Some(bg) = &self.background {
            scheme.background = parse_rgb("background", bg)?;
        }
        for (name, slot, paint) in [
            ("wall", &mut scheme.wall, &self.wall),
            ("ceiling", &mut scheme.ceiling, &self.ceiling),
            ("floor", &mut scheme.floor, &self.floor),
            ("start", &mut scheme.start, &self.start),
            ("finish", &mut scheme.finish, &self.finish),
        ] {
            if let Some(paint) = paint {
                *slot = paint.apply(name, *slot)?;
            }
        }
        Ok(scheme)
    }
}

impl PaintFile {
    fn apply(&self, name: &str, base: Paint) -> Result<Paint> {
        let mut paint = base;
        if let Some(s) = &self.surface {
            paint.surface = parse_rgb(name, s)?;
        }
        if let Some(b) = &self.border {
            paint.border = parse_rgb(name, b)?;
        }
        Ok(paint)
    }
}

fn parse_rgb(field: &str, value: &str) -> Result<Rgb> {
    Rgb::from_hex(value)
        .with_context(|| format!("{}: expected #rrggbb, got {:?}", field, value))
}

pub fn parse_color_scheme(json: &str) -> Result<ColorScheme> {
    let file: ColorFile = serde_json::from_str(json).context("invalid colour file")?;
    file.apply(ColorScheme::default())
}

pub fn load_color_scheme(path: &Path) -> Result<ColorScheme> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading colour file {}", path.display()))?;
    let scheme = parse_color_scheme(&text)
        .with_context(|| format!("parsing colour file {}", path.display()))?;
    log::info!("loaded colour scheme from {}", path.display());
    Ok(scheme)
}
