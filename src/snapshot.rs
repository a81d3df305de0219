//! Visual snapshot capability: turns an on-screen region into a raster.

use std::collections::HashMap;
use std::path::PathBuf;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::debug;

use crate::canvas::Rgb;
use crate::error::RenderError;

/// How a region is captured.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Device pixel ratio of the capture.
    pub scale: f32,
    /// Painted under transparent pixels.
    pub background: Rgb,
    /// Whether cross-origin images inside the region may be drawn.
    pub allow_cross_origin: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Rgb::WHITE,
            allow_cross_origin: true,
        }
    }
}

/// Captures a live region identified by `target_id`.
pub trait VisualSnapshot {
    /// `Ok(None)` when no region with that id exists.
    fn capture(
        &self,
        target_id: &str,
        options: &CaptureOptions,
    ) -> Result<Option<RgbImage>, RenderError>;
}

/// Composites `image` over `background`, dropping the alpha channel.
pub fn flatten(image: &RgbaImage, background: Rgb) -> RgbImage {
    let Rgb(br, bg, bb) = background;
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let blend = |fg: u8, back: u8| -> u8 {
            let a = u16::from(a);
            ((u16::from(fg) * a + u16::from(back) * (255 - a) + 127) / 255) as u8
        };
        image::Rgb([blend(r, br), blend(g, bg), blend(b, bb)])
    })
}

/// Applies `options` to a decoded region image: flatten, then scale.
pub fn prepare_capture(image: DynamicImage, options: &CaptureOptions) -> RgbImage {
    let flat = flatten(&image.to_rgba8(), options.background);
    if (options.scale - 1.0).abs() < f32::EPSILON || options.scale <= 0.0 {
        return flat;
    }
    let width = ((flat.width() as f32) * options.scale).round().max(1.0) as u32;
    let height = ((flat.height() as f32) * options.scale).round().max(1.0) as u32;
    image::imageops::resize(&flat, width, height, FilterType::Triangle)
}

/// Regions pre-rendered to `<root>/<target_id>.png` (or `.jpg`).
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    root: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, target_id: &str) -> Option<PathBuf> {
        // Ids are plain names; anything path-like cannot be a region.
        if target_id.is_empty()
            || target_id.contains(['/', '\\'])
            || target_id.starts_with('.')
        {
            return None;
        }
        ["png", "jpg", "jpeg"]
            .iter()
            .map(|ext| self.root.join(format!("{target_id}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl VisualSnapshot for FileSnapshotSource {
    fn capture(
        &self,
        target_id: &str,
        options: &CaptureOptions,
    ) -> Result<Option<RgbImage>, RenderError> {
        let Some(path) = self.resolve(target_id) else {
            return Ok(None);
        };
        let decoded = image::open(&path).map_err(|e| {
            RenderError::Image(format!("Failed to decode {}: {e}", path.display()))
        })?;
        let raster = prepare_capture(decoded, options);
        debug!(
            target = target_id,
            width = raster.width(),
            height = raster.height(),
            "Captured region"
        );
        Ok(Some(raster))
    }
}

/// In-memory regions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    regions: HashMap<String, RgbaImage>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, target_id: impl Into<String>, image: RgbaImage) -> Self {
        self.regions.insert(target_id.into(), image);
        self
    }
}

impl VisualSnapshot for MemorySnapshot {
    fn capture(
        &self,
        target_id: &str,
        options: &CaptureOptions,
    ) -> Result<Option<RgbImage>, RenderError> {
        Ok(self
            .regions
            .get(target_id)
            .map(|img| prepare_capture(DynamicImage::ImageRgba8(img.clone()), options)))
    }
}
