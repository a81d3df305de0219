//! Layout primitives: the explicit cursor, the pickup table's columns,
//! cell truncation and snapshot tiling.

use std::borrow::Cow;

use crate::canvas::Canvas;
use crate::config::ReportConfig;
use crate::error::RenderError;

/// Average glyph width at table font size, used to budget cell text.
pub const AVG_CHAR_WIDTH_MM: f32 = 1.5;
pub const ELLIPSIS: &str = "...";
/// Height of the shaded column-title band above table rows.
pub const TABLE_HEADER_HEIGHT_MM: f32 = 8.0;

/// Vertical drawing position on the active page.
///
/// Passed by value through every drawing step and returned advanced; there
/// is no shared cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    page: usize,
    y: f32,
}

impl LayoutCursor {
    pub fn new(top_mm: f32) -> Self {
        Self { page: 1, y: top_mm }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn advance(self, dy_mm: f32) -> Self {
        Self {
            y: self.y + dy_mm,
            ..self
        }
    }

    /// Whether a block of `height_mm` starting here stays above `threshold_mm`.
    pub fn fits(&self, height_mm: f32, threshold_mm: f32) -> bool {
        self.y + height_mm <= threshold_mm
    }

    #[must_use]
    pub fn next_page(self, top_mm: f32) -> Self {
        Self {
            page: self.page + 1,
            y: top_mm,
        }
    }
}

/// Adds a page when `height_mm` would cross the overflow threshold.
///
/// Returns the cursor to draw at and whether a break happened.
pub fn ensure_room<C: Canvas>(
    canvas: &mut C,
    cursor: LayoutCursor,
    height_mm: f32,
    config: &ReportConfig,
) -> Result<(LayoutCursor, bool), RenderError> {
    if cursor.fits(height_mm, config.overflow_threshold_mm()) {
        return Ok((cursor, false));
    }
    canvas.add_page()?;
    let next = cursor.next_page(config.margin_mm);
    tracing::debug!(page = canvas.current_page(), "Page break");
    Ok((next, true))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub header: &'static str,
    pub width_mm: f32,
}

impl Column {
    pub fn char_budget(&self) -> usize {
        char_budget(self.width_mm)
    }
}

/// Pickup table columns. Widths add up to the 170 mm A4 content width.
pub const PICKUP_COLUMNS: [Column; 8] = [
    Column { header: "Pickup ID", width_mm: 20.0 },
    Column { header: "Order ID", width_mm: 22.0 },
    Column { header: "Customer", width_mm: 30.0 },
    Column { header: "Dealer", width_mm: 26.0 },
    Column { header: "Scheduled Date", width_mm: 28.0 },
    Column { header: "Status", width_mm: 18.0 },
    Column { header: "Priority", width_mm: 13.0 },
    Column { header: "Items", width_mm: 13.0 },
];

/// Left edge of each column starting from `start_x_mm`.
pub fn column_offsets(columns: &[Column], start_x_mm: f32) -> Vec<f32> {
    columns
        .iter()
        .scan(start_x_mm, |x, col| {
            let left = *x;
            *x += col.width_mm;
            Some(left)
        })
        .collect()
}

/// Number of characters a cell of `width_mm` can show.
pub fn char_budget(width_mm: f32) -> usize {
    (width_mm / AVG_CHAR_WIDTH_MM).floor().max(0.0) as usize
}

/// Cuts `text` to `budget` characters and appends `...` when it is longer.
pub fn truncate_cell(text: &str, budget: usize) -> Cow<'_, str> {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// Height in mm of an image of `width_px` × `height_px` drawn `target_width_mm` wide.
pub fn scaled_height(width_px: u32, height_px: u32, target_width_mm: f32) -> f32 {
    if width_px == 0 {
        return 0.0;
    }
    height_px as f32 * target_width_mm / width_px as f32
}

/// Vertical offsets that tile an image of `image_height_mm` over pages of
/// `stride_mm`: page k draws the image at `-k * stride`.
///
/// Always at least one page. An exact multiple of the stride does not add a
/// trailing blank page.
pub fn tile_offsets(image_height_mm: f32, stride_mm: f32) -> Vec<f32> {
    if stride_mm <= 0.0 || image_height_mm <= 0.0 {
        return vec![0.0];
    }
    // Tolerance keeps float noise on exact multiples from adding a page.
    let pages = ((image_height_mm / stride_mm) - 1e-4).ceil().max(1.0) as usize;
    (0..pages).map(|k| -(k as f32) * stride_mm).collect()
}
