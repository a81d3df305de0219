use std::path::PathBuf;

use thiserror::Error;

/// Failure inside one drawing/persisting step. Carries the real cause.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Element not found: {0}")]
    TargetNotFound(String),

    #[error("PDF backend error: {0}")]
    Backend(String),

    #[error("Image processing error: {0}")]
    Image(String),

    #[error("Invalid raster: {width}x{height}")]
    InvalidRaster { width: u32, height: u32 },

    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid report config: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Coarse classification of a [`RenderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something that does not exist.
    Input,
    /// The canvas, image codec or file system failed.
    Backend,
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TargetNotFound(_) => ErrorKind::Input,
            _ => ErrorKind::Backend,
        }
    }
}

/// Operation-level error. The message stays generic for callers matching
/// on text; the underlying [`RenderError`] is available as `source()`.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to generate PDF")]
    ListReport(#[source] RenderError),

    #[error("Failed to generate single pickup PDF")]
    SingleReport(#[source] RenderError),

    #[error("Failed to generate PDF from element")]
    Snapshot(#[source] RenderError),

    #[error("Report task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ReportError {
    /// The wrapped cause, when the failure came from rendering.
    pub fn cause(&self) -> Option<&RenderError> {
        match self {
            Self::ListReport(e) | Self::SingleReport(e) | Self::Snapshot(e) => Some(e),
            Self::Join(_) => None,
        }
    }
}
