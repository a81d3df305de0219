//! Detail sheet for a single pickup.

use super::RenderContext;
use crate::canvas::{Canvas, FontWeight, Rgb};
use crate::error::RenderError;
use crate::format::{format_address, format_date};
use crate::layout::{ensure_room, LayoutCursor};
use crate::models::PickupRecord;

pub const TITLE: &str = "Pickup Details";

/// Draws one line after making sure it fits, then advances by `advance`.
fn line<C: Canvas>(
    canvas: &mut C,
    cursor: LayoutCursor,
    text: &str,
    advance: f32,
    ctx: &RenderContext<'_>,
) -> Result<LayoutCursor, RenderError> {
    let (cursor, _) = ensure_room(canvas, cursor, advance, ctx.config)?;
    canvas.text(text, ctx.config.margin_mm, cursor.y())?;
    Ok(cursor.advance(advance))
}

fn section<C: Canvas>(
    canvas: &mut C,
    cursor: LayoutCursor,
    title: &str,
    ctx: &RenderContext<'_>,
) -> Result<LayoutCursor, RenderError> {
    canvas.set_font(12.0, FontWeight::Bold);
    let cursor = line(canvas, cursor, title, 8.0, ctx)?;
    canvas.set_font(10.0, FontWeight::Normal);
    Ok(cursor)
}

/// Body lines with 6 mm spacing; the last one gets 10 mm before the next section.
fn block<C: Canvas>(
    canvas: &mut C,
    mut cursor: LayoutCursor,
    lines: &[String],
    ctx: &RenderContext<'_>,
) -> Result<LayoutCursor, RenderError> {
    for (i, text) in lines.iter().enumerate() {
        let advance = if i + 1 == lines.len() { 10.0 } else { 6.0 };
        cursor = line(canvas, cursor, text, advance, ctx)?;
    }
    Ok(cursor)
}

pub fn render<C: Canvas>(
    canvas: &mut C,
    record: &PickupRecord,
    ctx: &RenderContext<'_>,
) -> Result<(), RenderError> {
    let mut cursor = LayoutCursor::new(ctx.config.margin_mm);
    canvas.set_text_color(Rgb::BLACK);

    canvas.set_font(20.0, FontWeight::Bold);
    cursor = line(canvas, cursor, TITLE, 15.0, ctx)?;

    canvas.set_font(14.0, FontWeight::Bold);
    cursor = line(
        canvas,
        cursor,
        &format!("Pickup ID: {}", record.pickup_id),
        10.0,
        ctx,
    )?;

    cursor = section(canvas, cursor, "Basic Information", ctx)?;
    cursor = block(
        canvas,
        cursor,
        &[
            format!("Order ID: {}", record.order_id),
            format!("Customer: {}", record.customer_name),
            format!("Dealer: {}", record.dealer_name),
            format!(
                "Scheduled Date: {}",
                format_date(&record.scheduled_date, &ctx.offset)
            ),
            format!("Status: {}", record.status.label()),
            format!("Priority: {}", record.priority.label()),
        ],
        ctx,
    )?;

    cursor = section(canvas, cursor, "Customer Details", ctx)?;
    cursor = block(
        canvas,
        cursor,
        &[
            format!("Name: {}", record.customer_name),
            format!("Phone: {}", record.customer_phone),
            format!("Email: {}", record.customer_email),
            format!(
                "Address: {}",
                format_address(record.pickup_address.as_ref())
            ),
        ],
        ctx,
    )?;

    cursor = section(canvas, cursor, "Items to Pickup", ctx)?;
    for (i, item) in record.items.iter().enumerate() {
        cursor = line(
            canvas,
            cursor,
            &format!("{}. {} (Qty: {})", i + 1, item.name, item.quantity),
            6.0,
            ctx,
        )?;
    }

    tracing::debug!(
        pickup_id = %record.pickup_id,
        pages = canvas.page_count(),
        "Laid out pickup detail"
    );
    Ok(())
}
