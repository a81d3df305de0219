use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::TABLE_HEADER_HEIGHT_MM;

/// Application-level constants
pub const APP_NAME: &str = "PickupReports";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overrides [`exports_dir`] when set.
pub const EXPORT_DIR_ENV: &str = "PICKUP_REPORT_EXPORT_DIR";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,pickup_report=debug"
}

/// Get the application data directory
/// ~/PickupReports/ on all platforms. Falls back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Directory finished reports are written to.
pub fn exports_dir() -> PathBuf {
    match std::env::var_os(EXPORT_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => app_data_dir().join("exports"),
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Page geometry and locale knobs for every report.
///
/// Lengths are millimetres. Defaults are A4 portrait with a 20 mm margin,
/// matching the storefront's printed pickup sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    /// Distance from the page bottom at which table rows stop.
    pub overflow_bottom_mm: f32,
    pub row_height_mm: f32,
    /// Offset applied to timestamps before formatting.
    pub utc_offset_minutes: i32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 20.0,
            overflow_bottom_mm: 30.0,
            row_height_mm: 6.0,
            utc_offset_minutes: 0,
        }
    }
}

impl ReportConfig {
    /// Load a JSON config; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_width_mm <= 2.0 * self.margin_mm {
            return Err(ConfigError::Invalid(format!(
                "page width {} leaves no room inside {} mm margins",
                self.page_width_mm, self.margin_mm
            )));
        }
        if self.row_height_mm <= 0.0 {
            return Err(ConfigError::Invalid("row height must be positive".into()));
        }
        // A fresh page must hold the table header and one row below the margin.
        let needed = self.margin_mm + TABLE_HEADER_HEIGHT_MM + self.row_height_mm;
        if needed > self.overflow_threshold_mm() {
            return Err(ConfigError::Invalid(format!(
                "page height {} cannot fit the table header and a row",
                self.page_height_mm
            )));
        }
        self.offset()?;
        Ok(())
    }

    /// The configured UTC offset as a chrono timezone.
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "UTC offset out of range: {} minutes",
                self.utc_offset_minutes
            ))
        })
    }

    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    /// Largest baseline a row may occupy before a page break.
    pub fn overflow_threshold_mm(&self) -> f32 {
        self.page_height_mm - self.overflow_bottom_mm
    }
}
