//! Raster fallback: one captured image spread over as many pages as it needs.

use image::RgbImage;
use tracing::debug;

use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::layout::{scaled_height, tile_offsets};

/// Draws `raster` at full page width, repeating it on each page shifted up
/// by one page height so every page shows the next slice.
pub fn render<C: Canvas>(canvas: &mut C, raster: &RgbImage) -> Result<(), RenderError> {
    let (width_px, height_px) = raster.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err(RenderError::InvalidRaster {
            width: width_px,
            height: height_px,
        });
    }

    let page = canvas.page_size();
    let image_w = page.width_mm;
    let image_h = scaled_height(width_px, height_px, image_w);

    for (i, offset) in tile_offsets(image_h, page.height_mm).into_iter().enumerate() {
        if i > 0 {
            canvas.add_page()?;
        }
        canvas.image(raster, 0.0, offset, image_w, image_h)?;
        debug!(
            page = canvas.current_page(),
            tile = i,
            offset_mm = offset,
            "Placed snapshot tile"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, PageSize, RecordingCanvas};

    fn offsets(rec: &crate::canvas::Recording) -> Vec<f32> {
        rec.pages
            .iter()
            .flat_map(|p| p.images())
            .map(|op| match op {
                DrawOp::Image { y, .. } => *y,
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn two_and_a_half_pages_of_image_make_three_pages() {
        // 210 mm wide at 1000 px → 297 mm page = 1414.28 px; 2.5 pages ≈ 3536 px.
        let height_px = (2.5 * 297.0 * 1000.0 / 210.0_f32).round() as u32;
        let raster = RgbImage::new(1000, height_px);
        let mut canvas = RecordingCanvas::new("snap", PageSize::A4);
        render(&mut canvas, &raster).unwrap();

        let rec = canvas.recording();
        assert_eq!(rec.pages.len(), 3);
        assert_eq!(offsets(rec), vec![0.0, -297.0, -594.0]);
        for page in &rec.pages {
            assert_eq!(page.images().count(), 1);
        }
    }

    #[test]
    fn image_is_full_width_with_proportional_height() {
        let raster = RgbImage::new(420, 210);
        let mut canvas = RecordingCanvas::new("snap", PageSize::A4);
        render(&mut canvas, &raster).unwrap();

        let rec = canvas.recording();
        assert_eq!(rec.pages.len(), 1);
        let op = rec.pages[0].images().next().cloned().unwrap();
        match op {
            DrawOp::Image { x, w, h, .. } => {
                assert_eq!(x, 0.0);
                assert_eq!(w, 210.0);
                assert_eq!(h, 105.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_raster_is_rejected() {
        let mut canvas = RecordingCanvas::new("snap", PageSize::A4);
        assert!(matches!(
            render(&mut canvas, &RgbImage::new(0, 10)),
            Err(RenderError::InvalidRaster { .. })
        ));
    }
}
