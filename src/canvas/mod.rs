//! Document canvas capability.
//!
//! The report layouts draw through [`Canvas`] so the same layout code can
//! target the printpdf backend in production and [`RecordingCanvas`] in
//! tests. Coordinates are millimetres measured from the top-left corner of
//! the active page; text `y` is the baseline.

pub mod pdf;
pub mod recording;

pub use pdf::{PdfCanvas, PdfCanvasFactory};
pub use recording::{DrawOp, RecordedPage, Recording, RecordingCanvas, RecordingCanvasFactory};

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;
use crate::error::RenderError;

/// Physical page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };
}

impl From<&ReportConfig> for PageSize {
    fn from(config: &ReportConfig) -> Self {
        Self {
            width_mm: config.page_width_mm,
            height_mm: config.page_height_mm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontWeight {
    Normal,
    Bold,
}

/// 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub(crate) fn unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

/// Page-oriented drawing surface.
///
/// Pages are numbered from 1. A new canvas starts with one page active.
pub trait Canvas {
    fn page_size(&self) -> PageSize;

    fn page_count(&self) -> usize;

    fn current_page(&self) -> usize;

    /// Appends a page and makes it the active one.
    fn add_page(&mut self) -> Result<(), RenderError>;

    fn set_page(&mut self, page: usize) -> Result<(), RenderError>;

    fn set_font(&mut self, size_pt: f32, weight: FontWeight);

    fn set_text_color(&mut self, color: Rgb);

    fn set_fill_color(&mut self, color: Rgb);

    fn text(&mut self, text: &str, x_mm: f32, y_mm: f32) -> Result<(), RenderError>;

    fn fill_rect(&mut self, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32)
        -> Result<(), RenderError>;

    /// Draws `image` stretched to `w_mm` × `h_mm` with its top-left corner at
    /// (`x_mm`, `y_mm`). Parts outside the page are clipped.
    fn image(
        &mut self,
        image: &RgbImage,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
    ) -> Result<(), RenderError>;

    /// Serializes the document. The canvas is gone afterwards.
    fn finish(self) -> Result<Vec<u8>, RenderError>
    where
        Self: Sized;
}

/// Creates fresh canvases, one per generated document.
pub trait CanvasFactory {
    type Canvas: Canvas;

    /// `created` is stamped into the document metadata so the same input at
    /// the same instant serializes to the same bytes.
    fn create(
        &self,
        title: &str,
        page: PageSize,
        created: DateTime<Utc>,
    ) -> Result<Self::Canvas, RenderError>;
}
