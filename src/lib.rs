pub mod canvas; // Drawing surface: PDF backend + recording double
pub mod config;
pub mod error;
pub mod export; // Where finished documents land
pub mod format;
pub mod layout; // Cursor, page breaks, column math
pub mod models;
pub mod report; // List, single and snapshot reports
pub mod service;
pub mod snapshot; // Region capture for the raster fallback

pub use error::{RenderError, ReportError};
pub use report::{ReportGenerator, ReportOutput};
pub use service::ReportService;

use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` wins over the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
