//! Text and colour helpers shared by the report layouts.

use chrono::{DateTime, FixedOffset, Utc};

use crate::canvas::Rgb;
use crate::models::{Address, PickupStatus, Priority};

/// Placeholder for values the record does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// `Mar 5, 2024, 03:30 PM` in the given offset.
pub fn format_date(ts: &DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset)
        .format("%b %-d, %Y, %I:%M %p")
        .to_string()
}

/// `3/5/2024, 3:30:00 PM` in the given offset, for "Generated on" lines.
pub fn format_generated_on(ts: &DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

/// `street, city, state - pincode`, or `N/A` without an address.
pub fn format_address(address: Option<&Address>) -> String {
    match address {
        Some(a) => format!("{}, {}, {} - {}", a.street, a.city, a.state, a.pincode),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `YYYY-MM-DD` of the instant in UTC, used in file names.
pub fn file_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

pub const fn status_color(status: PickupStatus) -> Rgb {
    match status {
        PickupStatus::Pending => Rgb(0xf5, 0x9e, 0x0b),
        PickupStatus::Scheduled => Rgb(0x3b, 0x82, 0xf6),
        PickupStatus::InProgress => Rgb(0x8b, 0x5c, 0xf6),
        PickupStatus::Packed => Rgb(0x10, 0xb9, 0x81),
        PickupStatus::PickedUp => Rgb(0x63, 0x66, 0xf1),
        PickupStatus::Completed => Rgb(0x05, 0x96, 0x69),
        PickupStatus::Cancelled => Rgb(0xef, 0x44, 0x44),
    }
}

pub const fn priority_color(priority: Priority) -> Rgb {
    match priority {
        Priority::Urgent => Rgb(0xef, 0x44, 0x44),
        Priority::High => Rgb(0xf9, 0x73, 0x16),
        Priority::Medium => Rgb(0xea, 0xb3, 0x08),
        Priority::Low => Rgb(0x22, 0xc5, 0x5e),
    }
}
