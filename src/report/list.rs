//! Paginated pickup list.

use std::collections::BTreeMap;

use tracing::debug;

use super::RenderContext;
use crate::canvas::{Canvas, FontWeight, Rgb};
use crate::config::ReportConfig;
use crate::error::RenderError;
use crate::format::{format_date, format_generated_on, priority_color, status_color};
use crate::layout::{
    column_offsets, ensure_room, truncate_cell, LayoutCursor, PICKUP_COLUMNS,
    TABLE_HEADER_HEIGHT_MM,
};
use crate::models::{PickupRecord, PickupStatus, ReportOptions};

const HEADER_BAND: Rgb = Rgb(240, 240, 240);
/// Band top sits this far above the header baseline.
const HEADER_BAND_LIFT: f32 = 5.0;
const CELL_PADDING: f32 = 2.0;
const HISTOGRAM_INDENT: f32 = 20.0;
const FOOTER_RIGHT_INSET: f32 = 30.0;
const FOOTER_BOTTOM_INSET: f32 = 10.0;

/// Count per status, in workflow order.
pub fn status_histogram(records: &[PickupRecord]) -> Vec<(PickupStatus, usize)> {
    let mut counts: BTreeMap<PickupStatus, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.status).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Draws the whole list onto `canvas`: content pass, then footer pass.
pub fn render<C: Canvas>(
    canvas: &mut C,
    records: &[PickupRecord],
    options: &ReportOptions,
    ctx: &RenderContext<'_>,
) -> Result<(), RenderError> {
    let config = ctx.config;
    let margin = config.margin_mm;
    let mut cursor = LayoutCursor::new(margin);

    // The title opens page 1, so it is never checked for room.
    canvas.set_text_color(Rgb::BLACK);
    canvas.set_font(20.0, FontWeight::Bold);
    canvas.text(options.title(), margin, cursor.y())?;
    cursor = cursor.advance(15.0);

    canvas.set_font(10.0, FontWeight::Normal);
    cursor = line(
        canvas,
        cursor,
        &format!("Generated on: {}", format_generated_on(&ctx.now, &ctx.offset)),
        margin,
        10.0,
        config,
    )?;

    cursor = heading(canvas, cursor, "Summary", config)?;
    cursor = line(
        canvas,
        cursor,
        &format!("Total Pickups: {}", records.len()),
        margin,
        6.0,
        config,
    )?;
    for (status, count) in status_histogram(records) {
        cursor = line(
            canvas,
            cursor,
            &format!("{}: {count}", status.label()),
            margin + HISTOGRAM_INDENT,
            5.0,
            config,
        )?;
    }
    cursor = cursor.advance(10.0);

    let filter_lines = options.filter_lines();
    if !filter_lines.is_empty() {
        cursor = heading(canvas, cursor, "Applied Filters", config)?;
        for text in &filter_lines {
            cursor = line(canvas, cursor, text, margin, 5.0, config)?;
        }
        cursor = cursor.advance(10.0);
    }

    canvas.set_font(12.0, FontWeight::Bold);
    cursor = line(canvas, cursor, "Pickup Details", margin, 10.0, config)?;

    // Header and first row stay together.
    let (next, _) = ensure_room(
        canvas,
        cursor,
        TABLE_HEADER_HEIGHT_MM + config.row_height_mm,
        config,
    )?;
    cursor = table_header(canvas, next, config)?;
    for record in records {
        let (next, broke) = ensure_room(canvas, cursor, config.row_height_mm, config)?;
        cursor = if broke {
            table_header(canvas, next, config)?
        } else {
            next
        };
        row(canvas, cursor, record, ctx)?;
        cursor = cursor.advance(config.row_height_mm);
    }

    let pages = stamp_footers(canvas)?;
    debug!(rows = records.len(), pages, "Laid out pickup list");
    Ok(())
}

/// One text line at `x`, moved to a new page first when `advance` does not fit.
fn line<C: Canvas>(
    canvas: &mut C,
    cursor: LayoutCursor,
    text: &str,
    x: f32,
    advance: f32,
    config: &ReportConfig,
) -> Result<LayoutCursor, RenderError> {
    let (cursor, _) = ensure_room(canvas, cursor, advance, config)?;
    canvas.text(text, x, cursor.y())?;
    Ok(cursor.advance(advance))
}

/// 12pt bold section heading, leaving the font at 10pt normal for the body.
fn heading<C: Canvas>(
    canvas: &mut C,
    cursor: LayoutCursor,
    title: &str,
    config: &ReportConfig,
) -> Result<LayoutCursor, RenderError> {
    canvas.set_font(12.0, FontWeight::Bold);
    let cursor = line(canvas, cursor, title, config.margin_mm, 8.0, config)?;
    canvas.set_font(10.0, FontWeight::Normal);
    Ok(cursor)
}

/// Shaded band with column titles. Leaves the row font selected.
fn table_header<C: Canvas>(
    canvas: &mut C,
    cursor: LayoutCursor,
    config: &ReportConfig,
) -> Result<LayoutCursor, RenderError> {
    let x0 = config.margin_mm;
    canvas.set_fill_color(HEADER_BAND);
    canvas.fill_rect(
        x0,
        cursor.y() - HEADER_BAND_LIFT,
        config.content_width_mm(),
        TABLE_HEADER_HEIGHT_MM,
    )?;

    canvas.set_font(8.0, FontWeight::Bold);
    canvas.set_text_color(Rgb::BLACK);
    for (col, x) in PICKUP_COLUMNS.iter().zip(column_offsets(&PICKUP_COLUMNS, x0)) {
        canvas.text(col.header, x + CELL_PADDING, cursor.y())?;
    }

    canvas.set_font(7.0, FontWeight::Normal);
    Ok(cursor.advance(TABLE_HEADER_HEIGHT_MM))
}

fn row<C: Canvas>(
    canvas: &mut C,
    cursor: LayoutCursor,
    record: &PickupRecord,
    ctx: &RenderContext<'_>,
) -> Result<(), RenderError> {
    let cells: [(String, Rgb); 8] = [
        (record.pickup_id.clone(), Rgb::BLACK),
        (record.order_id.clone(), Rgb::BLACK),
        (record.customer_name.clone(), Rgb::BLACK),
        (record.dealer_name.clone(), Rgb::BLACK),
        (format_date(&record.scheduled_date, &ctx.offset), Rgb::BLACK),
        (
            record.status.label().to_string(),
            status_color(record.status),
        ),
        (
            record.priority.label().to_string(),
            priority_color(record.priority),
        ),
        (record.items.len().to_string(), Rgb::BLACK),
    ];

    let offsets = column_offsets(&PICKUP_COLUMNS, ctx.config.margin_mm);
    for ((col, x), (text, color)) in PICKUP_COLUMNS.iter().zip(offsets).zip(cells.iter()) {
        canvas.set_text_color(*color);
        canvas.text(&truncate_cell(text, col.char_budget()), x + CELL_PADDING, cursor.y())?;
    }
    canvas.set_text_color(Rgb::BLACK);
    Ok(())
}

/// Second pass: the total is only known once every row is placed.
fn stamp_footers<C: Canvas>(canvas: &mut C) -> Result<usize, RenderError> {
    let total = canvas.page_count();
    let size = canvas.page_size();
    for page in 1..=total {
        canvas.set_page(page)?;
        canvas.set_font(8.0, FontWeight::Normal);
        canvas.set_text_color(Rgb::BLACK);
        canvas.text(
            &format!("Page {page} of {total}"),
            size.width_mm - FOOTER_RIGHT_INSET,
            size.height_mm - FOOTER_BOTTOM_INSET,
        )?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, PageSize, Recording, RecordingCanvas};
    use crate::models::ReportFilters;
    use crate::report::test_support::{fixed_now, record, records};

    fn draw(records: &[PickupRecord], options: &ReportOptions) -> Recording {
        draw_with(&ReportConfig::default(), records, options)
    }

    fn draw_with(
        config: &ReportConfig,
        records: &[PickupRecord],
        options: &ReportOptions,
    ) -> Recording {
        let ctx = RenderContext {
            config,
            offset: config.offset().unwrap(),
            now: fixed_now(),
        };
        let mut canvas = RecordingCanvas::new("t", PageSize::from(config));
        render(&mut canvas, records, options, &ctx).unwrap();
        canvas.recording().clone()
    }

    fn is_row_cell(op: &DrawOp) -> bool {
        matches!(op, DrawOp::Text { text, size, .. } if *size == 7.0 && text.starts_with("PU-"))
    }

    fn rows_per_page(rec: &Recording) -> Vec<usize> {
        rec.pages
            .iter()
            .map(|p| p.ops.iter().filter(|op| is_row_cell(op)).count())
            .collect()
    }

    /// First page holds 29 rows with one status line, later pages 39.
    fn expected_pages(n: usize) -> usize {
        if n <= 29 {
            1
        } else {
            1 + (n - 29).div_ceil(39)
        }
    }

    #[test]
    fn empty_input_is_one_page_with_zero_total() {
        let rec = draw(&[], &ReportOptions::default());
        assert_eq!(rec.pages.len(), 1);
        let texts = rec.texts();
        assert!(texts.contains(&"Total Pickups: 0"));
        assert!(texts.contains(&"Pickup ID"));
        assert!(texts.contains(&"Page 1 of 1"));
        assert_eq!(rows_per_page(&rec), vec![0]);
    }

    #[test]
    fn title_defaults_and_overrides() {
        let rec = draw(&[], &ReportOptions::default());
        assert_eq!(rec.texts()[0], "Pickup List Report");

        let opts = ReportOptions {
            title: Some("Dealer pickups".into()),
            ..Default::default()
        };
        assert_eq!(draw(&[], &opts).texts()[0], "Dealer pickups");
    }

    #[test]
    fn histogram_lists_only_present_statuses() {
        let input = vec![
            record("PU-1", PickupStatus::Pending),
            record("PU-2", PickupStatus::Pending),
            record("PU-3", PickupStatus::Completed),
        ];
        let rec = draw(&input, &ReportOptions::default());
        let texts = rec.texts();
        assert!(texts.contains(&"Pending: 2"));
        assert!(texts.contains(&"Completed: 1"));

        let status_lines = texts
            .iter()
            .filter(|t| PickupStatus::ALL.iter().any(|s| t.starts_with(&format!("{}: ", s.label()))))
            .count();
        assert_eq!(status_lines, 2);
    }

    #[test]
    fn histogram_order_ignores_input_order() {
        let a = vec![
            record("PU-1", PickupStatus::Completed),
            record("PU-2", PickupStatus::Pending),
        ];
        let b = vec![a[1].clone(), a[0].clone()];
        assert_eq!(status_histogram(&a), status_histogram(&b));
        assert_eq!(
            status_histogram(&a),
            vec![(PickupStatus::Pending, 1), (PickupStatus::Completed, 1)]
        );
    }

    #[test]
    fn page_counts_follow_capacity() {
        for n in [1, 29, 30, 68, 69, 150] {
            let rec = draw(&records(n), &ReportOptions::default());
            assert_eq!(rec.pages.len(), expected_pages(n), "n = {n}");
            assert_eq!(rows_per_page(&rec).iter().sum::<usize>(), n, "n = {n}");
        }
    }

    #[test]
    fn pages_are_full_before_breaking() {
        let rec = draw(&records(100), &ReportOptions::default());
        let rows = rows_per_page(&rec);
        assert_eq!(rows, vec![29, 39, 32]);
    }

    #[test]
    fn every_page_footer_has_final_total() {
        let rec = draw(&records(100), &ReportOptions::default());
        let total = rec.pages.len();
        for (i, page) in rec.pages.iter().enumerate() {
            let footers: Vec<_> = page.texts().filter(|t| t.starts_with("Page ")).collect();
            assert_eq!(footers, vec![format!("Page {} of {total}", i + 1)]);
        }
    }

    #[test]
    fn header_is_redrawn_identically_on_each_page() {
        let rec = draw(&records(80), &ReportOptions::default());
        let header_ops = |page: usize| -> Vec<DrawOp> {
            rec.pages[page]
                .ops
                .iter()
                .filter(|op| match op {
                    DrawOp::Rect { .. } => true,
                    DrawOp::Text { size, .. } => *size == 8.0,
                    _ => false,
                })
                .filter(|op| !matches!(op, DrawOp::Text { text, .. } if text.starts_with("Page ")))
                .map(|op| match op.clone() {
                    DrawOp::Text { text, x, size, weight, color, .. } => DrawOp::Text {
                        text,
                        x,
                        y: 0.0,
                        size,
                        weight,
                        color,
                    },
                    DrawOp::Rect { x, w, h, color, .. } => DrawOp::Rect {
                        x,
                        y: 0.0,
                        w,
                        h,
                        color,
                    },
                    other => other,
                })
                .collect()
        };
        let first = header_ops(0);
        assert_eq!(first.len(), 9);
        assert_eq!(header_ops(1), first);
        assert_eq!(header_ops(2), first);
    }

    #[test]
    fn rows_never_cross_overflow_threshold() {
        let rec = draw(&records(120), &ReportOptions::default());
        let threshold = ReportConfig::default().overflow_threshold_mm();
        for page in &rec.pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    if is_row_cell(op) {
                        assert!(y + 6.0 <= threshold);
                    }
                }
            }
        }
    }

    #[test]
    fn long_cells_are_truncated() {
        let mut r = record("PU-1", PickupStatus::Pending);
        r.customer_name = "y".repeat(200);
        let rec = draw(&[r], &ReportOptions::default());
        let expected = format!("{}...", "y".repeat(20));
        assert!(rec.texts().contains(&expected.as_str()));
    }

    #[test]
    fn status_and_priority_cells_are_coloured() {
        let rec = draw(&[record("PU-1", PickupStatus::Cancelled)], &ReportOptions::default());
        let colour_of = |needle: &str| {
            rec.pages[0].ops.iter().find_map(|op| match op {
                DrawOp::Text { text, size, color, .. } if text == needle && *size == 7.0 => {
                    Some(*color)
                }
                _ => None,
            })
        };
        assert_eq!(colour_of("Cancelled"), Some(status_color(PickupStatus::Cancelled)));
        assert_eq!(colour_of("High"), Some(priority_color(crate::models::Priority::High)));
        assert_eq!(colour_of("2"), Some(Rgb::BLACK));
    }

    #[test]
    fn filters_rendered_only_when_requested() {
        let filters = ReportFilters {
            status: Some("pending".into()),
            priority: Some("all".into()),
            search_term: Some("sofa".into()),
        };
        let with = ReportOptions {
            include_filters: true,
            filters: Some(filters.clone()),
            ..Default::default()
        };
        let texts_with = draw(&[], &with);
        let texts = texts_with.texts();
        assert!(texts.contains(&"Applied Filters"));
        assert!(texts.contains(&"Status: pending"));
        assert!(texts.contains(&"Search: sofa"));
        assert!(!texts.iter().any(|t| t.starts_with("Priority: ")));

        let without = ReportOptions {
            include_filters: false,
            filters: Some(filters),
            ..Default::default()
        };
        assert!(!draw(&[], &without).texts().contains(&"Applied Filters"));
    }

    #[test]
    fn identical_input_draws_identically_except_timestamp() {
        let input = records(45);
        let opts = ReportOptions::default();
        let strip = |rec: Recording| -> Vec<DrawOp> {
            rec.pages
                .into_iter()
                .flat_map(|p| p.ops)
                .filter(|op| !matches!(op, DrawOp::Text { text, .. } if text.starts_with("Generated on: ")))
                .collect()
        };
        assert_eq!(strip(draw(&input, &opts)), strip(draw(&input, &opts)));
    }

    #[test]
    fn summary_breaks_across_short_pages() {
        let config = ReportConfig {
            page_height_mm: 80.0,
            ..Default::default()
        };
        config.validate().unwrap();
        let opts = ReportOptions {
            include_filters: true,
            filters: Some(ReportFilters {
                status: Some("pending".into()),
                priority: Some("high".into()),
                search_term: Some("sofa".into()),
            }),
            ..Default::default()
        };
        let input: Vec<_> = PickupStatus::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| record(&format!("PU-{i}"), *s))
            .collect();
        let rec = draw_with(&config, &input, &opts);

        assert!(rec.pages.len() > 2);
        assert_eq!(rows_per_page(&rec).iter().sum::<usize>(), input.len());
        let threshold = config.overflow_threshold_mm();
        for page in &rec.pages {
            for op in &page.ops {
                if let DrawOp::Text { text, y, .. } = op {
                    if !text.starts_with("Page ") {
                        assert!(*y <= threshold, "{text:?} at {y} mm");
                    }
                }
            }
        }
        let texts = rec.texts();
        for status in PickupStatus::ALL {
            assert!(texts.contains(&format!("{}: 1", status.label()).as_str()));
        }
        assert!(texts.contains(&"Search: sofa"));
    }

    #[test]
    fn table_header_moves_with_its_first_row() {
        // Threshold 90 mm: "Pickup Details" fits at 74 mm, header plus a row would reach 98 mm.
        let config = ReportConfig {
            page_height_mm: 120.0,
            ..Default::default()
        };
        config.validate().unwrap();
        let rec = draw_with(&config, &records(1), &ReportOptions::default());

        assert_eq!(rec.pages.len(), 2);
        let first: Vec<_> = rec.pages[0].texts().collect();
        assert!(first.contains(&"Pickup Details"));
        assert!(!first.contains(&"Pickup ID"));
        assert_eq!(rows_per_page(&rec), vec![0, 1]);
        assert_eq!(rec.pages[1].texts().next(), Some("Pickup ID"));
    }
}
