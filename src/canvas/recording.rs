//! In-memory canvas that records every draw call.
//!
//! Used by layout tests and anywhere the drawn content needs inspecting
//! instead of rasterising. `finish` serializes the recording as JSON, so the
//! output of two runs can be compared byte for byte.

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::{Canvas, CanvasFactory, FontWeight, PageSize, Rgb};
use crate::error::RenderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        color: Rgb,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        width_px: u32,
        height_px: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedPage {
    pub ops: Vec<DrawOp>,
}

impl RecordedPage {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub title: String,
    pub page_size: PageSize,
    pub pages: Vec<RecordedPage>,
}

impl Recording {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// All text on all pages, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.pages.iter().flat_map(|p| p.texts()).collect()
    }
}

pub struct RecordingCanvas {
    recording: Recording,
    current: usize,
    font_size: f32,
    weight: FontWeight,
    text_color: Rgb,
    fill_color: Rgb,
}

impl RecordingCanvas {
    pub fn new(title: &str, page_size: PageSize) -> Self {
        Self {
            recording: Recording {
                title: title.to_owned(),
                page_size,
                pages: vec![RecordedPage::default()],
            },
            current: 0,
            font_size: 10.0,
            weight: FontWeight::Normal,
            text_color: Rgb::BLACK,
            fill_color: Rgb::BLACK,
        }
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    fn push(&mut self, op: DrawOp) {
        self.recording.pages[self.current].ops.push(op);
    }
}

impl Canvas for RecordingCanvas {
    fn page_size(&self) -> PageSize {
        self.recording.page_size
    }

    fn page_count(&self) -> usize {
        self.recording.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current + 1
    }

    fn add_page(&mut self) -> Result<(), RenderError> {
        self.recording.pages.push(RecordedPage::default());
        self.current = self.recording.pages.len() - 1;
        Ok(())
    }

    fn set_page(&mut self, page: usize) -> Result<(), RenderError> {
        let count = self.recording.pages.len();
        if page == 0 || page > count {
            return Err(RenderError::PageOutOfRange { page, count });
        }
        self.current = page - 1;
        Ok(())
    }

    fn set_font(&mut self, size_pt: f32, weight: FontWeight) {
        self.font_size = size_pt;
        self.weight = weight;
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    fn text(&mut self, text: &str, x_mm: f32, y_mm: f32) -> Result<(), RenderError> {
        self.push(DrawOp::Text {
            text: text.to_owned(),
            x: x_mm,
            y: y_mm,
            size: self.font_size,
            weight: self.weight,
            color: self.text_color,
        });
        Ok(())
    }

    fn fill_rect(
        &mut self,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
    ) -> Result<(), RenderError> {
        self.push(DrawOp::Rect {
            x: x_mm,
            y: y_mm,
            w: w_mm,
            h: h_mm,
            color: self.fill_color,
        });
        Ok(())
    }

    fn image(
        &mut self,
        image: &RgbImage,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
    ) -> Result<(), RenderError> {
        let (width_px, height_px) = image.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(RenderError::InvalidRaster {
                width: width_px,
                height: height_px,
            });
        }
        self.push(DrawOp::Image {
            x: x_mm,
            y: y_mm,
            w: w_mm,
            h: h_mm,
            width_px,
            height_px,
        });
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        serde_json::to_vec_pretty(&self.recording)
            .map_err(|e| RenderError::Backend(format!("Recording serialization error: {e}")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordingCanvasFactory;

impl CanvasFactory for RecordingCanvasFactory {
    type Canvas = RecordingCanvas;

    fn create(
        &self,
        title: &str,
        page: PageSize,
        _created: DateTime<Utc>,
    ) -> Result<RecordingCanvas, RenderError> {
        Ok(RecordingCanvas::new(title, page))
    }
}
