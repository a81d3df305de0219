//! printpdf-backed canvas.

use chrono::{DateTime, Utc};
use image::RgbImage;
use printpdf::lopdf::{self, Object, StringFormat};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerIndex, PdfLayerReference, PdfPageIndex, Rect,
};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::debug;

use super::{Canvas, CanvasFactory, FontWeight, PageSize, Rgb};
use crate::error::RenderError;

const LAYER_NAME: &str = "Layer 1";
/// Resolution images are embedded at before scaling to their target box.
const IMAGE_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;

pub struct PdfCanvas {
    doc: PdfDocumentReference,
    document_id: String,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    current: usize,
    size: PageSize,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    font_size: f32,
    weight: FontWeight,
    text_color: Rgb,
    fill_color: Rgb,
}

impl PdfCanvas {
    /// New document whose metadata dates and id are all taken from `created`.
    pub fn new(title: &str, size: PageSize, created: DateTime<Utc>) -> Result<Self, RenderError> {
        let stamp = OffsetDateTime::from_unix_timestamp(created.timestamp())
            .map_err(|e| RenderError::Backend(format!("PDF date error: {e}")))?;
        let document_id = document_id(title, &created);

        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(size.width_mm), Mm(size.height_mm), LAYER_NAME);
        let doc = doc
            .with_creation_date(stamp)
            .with_mod_date(stamp)
            .with_metadata_date(stamp)
            .with_document_id(document_id.clone());
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Backend(format!("PDF font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Backend(format!("PDF font error: {e}")))?;

        Ok(Self {
            doc,
            document_id,
            pages: vec![(page1, layer1)],
            current: 0,
            size,
            regular,
            bold,
            font_size: 10.0,
            weight: FontWeight::Normal,
            text_color: Rgb::BLACK,
            fill_color: Rgb::BLACK,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        let (page, layer) = self.pages[self.current];
        self.doc.get_page(page).get_layer(layer)
    }

    /// Converts a top-left based y into PDF's bottom-left based y.
    fn flip(&self, y_mm: f32) -> Mm {
        Mm(self.size.height_mm - y_mm)
    }
}

/// 32 hex characters derived from the title and creation instant.
fn document_id(title: &str, created: &DateTime<Utc>) -> String {
    let hash = Sha256::digest(format!("{title}\n{}", created.to_rfc3339()).as_bytes());
    let mut id = format!("{hash:x}");
    id.truncate(32);
    id
}

/// printpdf writes a fresh random pair into the trailer `/ID` on every save.
/// Replace it with `document_id` so equal input gives equal bytes.
fn stamp_trailer_id(bytes: &[u8], document_id: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| RenderError::Backend(format!("PDF reload error: {e}")))?;
    let id = || Object::String(document_id.as_bytes().to_vec(), StringFormat::Literal);
    doc.trailer.set("ID", Object::Array(vec![id(), id()]));

    let mut out = Vec::with_capacity(bytes.len());
    doc.save_to(&mut out)
        .map_err(|e| RenderError::Backend(format!("PDF save error: {e}")))?;
    Ok(out)
}

/// Pixel rows `[first, last)` of an image drawn `h_mm` tall at `y_mm` that
/// land on a page `page_h_mm` tall. `None` when nothing is on the page.
fn visible_rows(y_mm: f32, h_mm: f32, height_px: u32, page_h_mm: f32) -> Option<(u32, u32)> {
    if h_mm <= 0.0 || height_px == 0 {
        return None;
    }
    let top = y_mm.max(0.0);
    let bottom = (y_mm + h_mm).min(page_h_mm);
    if bottom <= top {
        return None;
    }
    let px_per_mm = height_px as f32 / h_mm;
    let first = (((top - y_mm) * px_per_mm).floor() as u32).min(height_px);
    let last = (((bottom - y_mm) * px_per_mm).ceil() as u32).min(height_px);
    (last > first).then_some((first, last))
}

fn pdf_color(color: Rgb) -> Color {
    let (r, g, b) = color.unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

impl Canvas for PdfCanvas {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current + 1
    }

    fn add_page(&mut self) -> Result<(), RenderError> {
        let (page, layer) =
            self.doc
                .add_page(Mm(self.size.width_mm), Mm(self.size.height_mm), LAYER_NAME);
        self.pages.push((page, layer));
        self.current = self.pages.len() - 1;
        Ok(())
    }

    fn set_page(&mut self, page: usize) -> Result<(), RenderError> {
        if page == 0 || page > self.pages.len() {
            return Err(RenderError::PageOutOfRange {
                page,
                count: self.pages.len(),
            });
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
        let layer = self.layer();
        let font = match self.weight {
            FontWeight::Normal => &self.regular,
            FontWeight::Bold => &self.bold,
        };
        // Text is painted with the fill colour in PDF.
        layer.set_fill_color(pdf_color(self.text_color));
        layer.use_text(text, self.font_size, Mm(x_mm), self.flip(y_mm), font);
        Ok(())
    }

    fn fill_rect(
        &mut self,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
    ) -> Result<(), RenderError> {
        let layer = self.layer();
        layer.set_fill_color(pdf_color(self.fill_color));
        layer.add_rect(Rect::new(
            Mm(x_mm),
            self.flip(y_mm + h_mm),
            Mm(x_mm + w_mm),
            self.flip(y_mm),
        ));
        Ok(())
    }

    /// Only the rows that fall on the page are embedded, so tiling one tall
    /// image over many pages stores each slice once.
    fn image(
        &mut self,
        image: &RgbImage,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
    ) -> Result<(), RenderError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidRaster { width, height });
        }
        let Some((first, last)) = visible_rows(y_mm, h_mm, height, self.size.height_mm) else {
            return Ok(());
        };

        let rows = last - first;
        let slice = image::imageops::crop_imm(image, 0, first, width, rows).to_image();
        let mm_per_px = h_mm / height as f32;
        let slice_y = y_mm + first as f32 * mm_per_px;
        let slice_h = rows as f32 * mm_per_px;

        // Rebuilt through printpdf's own image crate from raw bytes.
        let raw = printpdf::image_crate::RgbImage::from_raw(width, rows, slice.into_raw())
            .ok_or(RenderError::InvalidRaster {
                width,
                height: rows,
            })?;
        let embedded =
            Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(raw));

        let native_w = width as f32 * MM_PER_INCH / IMAGE_DPI;
        let native_h = rows as f32 * MM_PER_INCH / IMAGE_DPI;
        embedded.add_to_layer(
            self.layer(),
            ImageTransform {
                translate_x: Some(Mm(x_mm)),
                translate_y: Some(self.flip(slice_y + slice_h)),
                scale_x: Some(w_mm / native_w),
                scale_y: Some(slice_h / native_h),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );

        debug!(
            page = self.current_page(),
            width_px = width,
            first_row = first,
            last_row = last,
            "Embedded image slice"
        );
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|e| RenderError::Backend(format!("PDF save error: {e}")))?;
        stamp_trailer_id(&bytes, &self.document_id)
    }
}

/// Produces [`PdfCanvas`] documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCanvasFactory;

impl CanvasFactory for PdfCanvasFactory {
    type Canvas = PdfCanvas;

    fn create(
        &self,
        title: &str,
        page: PageSize,
        created: DateTime<Utc>,
    ) -> Result<PdfCanvas, RenderError> {
        PdfCanvas::new(title, page, created)
    }
}
