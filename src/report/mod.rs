//! Report generation: list, single-record and snapshot documents.
//!
//! Each operation creates its own canvas, draws through an explicit
//! [`LayoutCursor`](crate::layout::LayoutCursor), finishes the document and
//! hands the bytes to a [`ReportSink`]. Failures are logged with their cause
//! and surfaced as one [`ReportError`] variant per operation.

pub mod list;
pub mod single;
pub mod snapshot;

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::canvas::{Canvas, CanvasFactory, PageSize, PdfCanvasFactory};
use crate::config::ReportConfig;
use crate::error::{RenderError, ReportError};
use crate::export::{safe_file_component, DirectorySink, ReportSink};
use crate::format::file_date;
use crate::models::{PickupRecord, ReportOptions};
use crate::snapshot::{CaptureOptions, VisualSnapshot};

/// File name used for snapshot exports when the caller gives none.
pub const DEFAULT_SNAPSHOT_FILE_NAME: &str = "pickup-list.pdf";

/// `pickup-list-YYYY-MM-DD.pdf`
pub fn list_file_name(now: &DateTime<Utc>) -> String {
    format!("pickup-list-{}.pdf", file_date(now))
}

/// `pickup-<id>-YYYY-MM-DD.pdf`
pub fn single_file_name(pickup_id: &str, now: &DateTime<Utc>) -> String {
    format!(
        "pickup-{}-{}.pdf",
        safe_file_component(pickup_id),
        file_date(now)
    )
}

/// What a finished report looks like to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutput {
    pub file_name: String,
    pub path: PathBuf,
    pub page_count: usize,
    pub size_bytes: usize,
}

/// Values every layout needs besides the canvas.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a ReportConfig,
    pub offset: FixedOffset,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(ts) => *ts,
        }
    }
}

/// Entry point for all three report kinds.
pub struct ReportGenerator<F, S> {
    factory: F,
    sink: S,
    config: ReportConfig,
    clock: Clock,
}

impl ReportGenerator<PdfCanvasFactory, DirectorySink> {
    /// PDF output written to `dir`.
    pub fn pdf(dir: impl Into<PathBuf>, config: ReportConfig) -> Self {
        Self::new(PdfCanvasFactory, DirectorySink::new(dir), config)
    }
}

impl<F: CanvasFactory, S: ReportSink> ReportGenerator<F, S> {
    pub fn new(factory: F, sink: S, config: ReportConfig) -> Self {
        Self {
            factory,
            sink,
            config,
            clock: Clock::System,
        }
    }

    /// Pins the generation instant (file names and "Generated on").
    pub fn with_fixed_time(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Clock::Fixed(now);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Paginated table of `records` with summary and page footers.
    pub fn list_report(
        &self,
        records: &[PickupRecord],
        options: &ReportOptions,
    ) -> Result<ReportOutput, ReportError> {
        self.try_list_report(records, options).map_err(|e| {
            error!(error = %e, records = records.len(), "Error generating PDF");
            ReportError::ListReport(e)
        })
    }

    /// Detail sheet for one record.
    pub fn single_report(&self, record: &PickupRecord) -> Result<ReportOutput, ReportError> {
        self.try_single_report(record).map_err(|e| {
            error!(error = %e, pickup_id = %record.pickup_id, "Error generating single pickup PDF");
            ReportError::SingleReport(e)
        })
    }

    /// Captures `target_id` through `source` and tiles it over pages.
    pub fn snapshot_report<V: VisualSnapshot + ?Sized>(
        &self,
        source: &V,
        target_id: &str,
        file_name: Option<&str>,
    ) -> Result<ReportOutput, ReportError> {
        let file_name = file_name.unwrap_or(DEFAULT_SNAPSHOT_FILE_NAME);
        self.try_snapshot_report(source, target_id, file_name)
            .map_err(|e| {
                error!(error = %e, target = target_id, "Error generating PDF from element");
                ReportError::Snapshot(e)
            })
    }

    fn context(&self) -> Result<RenderContext<'_>, RenderError> {
        self.config.validate()?;
        Ok(RenderContext {
            config: &self.config,
            offset: self.config.offset()?,
            now: self.clock.now(),
        })
    }

    fn try_list_report(
        &self,
        records: &[PickupRecord],
        options: &ReportOptions,
    ) -> Result<ReportOutput, RenderError> {
        let ctx = self.context()?;
        info!(records = records.len(), "Generating pickup list");
        let mut canvas = self
            .factory
            .create(options.title(), PageSize::from(&self.config), ctx.now)?;
        list::render(&mut canvas, records, options, &ctx)?;
        self.finish(canvas, &list_file_name(&ctx.now))
    }

    fn try_single_report(&self, record: &PickupRecord) -> Result<ReportOutput, RenderError> {
        let ctx = self.context()?;
        let mut canvas = self
            .factory
            .create(single::TITLE, PageSize::from(&self.config), ctx.now)?;
        single::render(&mut canvas, record, &ctx)?;
        self.finish(canvas, &single_file_name(&record.pickup_id, &ctx.now))
    }

    fn try_snapshot_report<V: VisualSnapshot + ?Sized>(
        &self,
        source: &V,
        target_id: &str,
        file_name: &str,
    ) -> Result<ReportOutput, RenderError> {
        let raster = source
            .capture(target_id, &CaptureOptions::default())?
            .ok_or_else(|| RenderError::TargetNotFound(target_id.to_owned()))?;
        let mut canvas = self
            .factory
            .create(file_name, PageSize::from(&self.config), self.clock.now())?;
        snapshot::render(&mut canvas, &raster)?;
        self.finish(canvas, file_name)
    }

    fn finish(&self, canvas: F::Canvas, file_name: &str) -> Result<ReportOutput, RenderError> {
        let page_count = canvas.page_count();
        let bytes = canvas.finish()?;
        let path = self.sink.persist(file_name, &bytes)?;
        info!(
            file = file_name,
            pages = page_count,
            bytes = bytes.len(),
            "Report saved"
        );
        Ok(ReportOutput {
            file_name: file_name.to_owned(),
            path,
            page_count,
            size_bytes: bytes.len(),
        })
    }
}


#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::test_support::*;
    use super::*;
    use crate::canvas::{Recording, RecordingCanvasFactory};
    use crate::error::ErrorKind;
    use crate::export::MemorySink;
    use crate::models::PickupStatus;
    use crate::snapshot::MemorySnapshot;

    fn generator() -> ReportGenerator<RecordingCanvasFactory, MemorySink> {
        ReportGenerator::new(
            RecordingCanvasFactory,
            MemorySink::new(),
            ReportConfig::default(),
        )
        .with_fixed_time(fixed_now())
    }

    #[test]
    fn file_names_carry_utc_date() {
        assert_eq!(list_file_name(&fixed_now()), "pickup-list-2024-03-05.pdf");
        assert_eq!(
            single_file_name("PU-7", &fixed_now()),
            "pickup-PU-7-2024-03-05.pdf"
        );
        assert_eq!(
            single_file_name("PU/7", &fixed_now()),
            "pickup-PU-7-2024-03-05.pdf"
        );
    }

    #[test]
    fn list_report_is_persisted_under_dated_name() {
        let gen = generator();
        let out = gen.list_report(&records(3), &ReportOptions::default()).unwrap();
        assert_eq!(out.file_name, "pickup-list-2024-03-05.pdf");
        assert_eq!(out.page_count, 1);
        assert!(gen.sink().get(&out.file_name).is_some());
    }

    #[test]
    fn single_report_is_persisted_under_id_name() {
        let gen = generator();
        let out = gen
            .single_report(&record("PU-42", PickupStatus::Packed))
            .unwrap();
        assert_eq!(out.file_name, "pickup-PU-42-2024-03-05.pdf");
        let bytes = gen.sink().get(&out.file_name).unwrap();
        let rec = Recording::from_bytes(&bytes).unwrap();
        assert!(rec.texts().contains(&"Pickup ID: PU-42"));
    }

    #[test]
    fn snapshot_missing_target_is_input_error() {
        let gen = generator();
        let err = gen
            .snapshot_report(&MemorySnapshot::new(), "pickup-table", None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate PDF from element");
        assert_eq!(err.cause().unwrap().kind(), ErrorKind::Input);
        assert!(gen.sink().file_names().is_empty());
    }

    #[test]
    fn snapshot_uses_default_file_name() {
        let gen = generator();
        let source = MemorySnapshot::new()
            .with_region("pickup-table", RgbaImage::from_pixel(100, 50, Rgba([0, 0, 0, 255])));
        let out = gen.snapshot_report(&source, "pickup-table", None).unwrap();
        assert_eq!(out.file_name, "pickup-list.pdf");
        assert_eq!(out.page_count, 1);
    }

    #[test]
    fn snapshot_honours_caller_file_name() {
        let gen = generator();
        let source = MemorySnapshot::new()
            .with_region("t", RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255])));
        let out = gen
            .snapshot_report(&source, "t", Some("dealer-board.pdf"))
            .unwrap();
        assert_eq!(out.file_name, "dealer-board.pdf");
    }

    #[test]
    fn backend_failure_wraps_with_generic_message() {
        struct FailingSink;
        impl ReportSink for FailingSink {
            fn persist(&self, file_name: &str, _bytes: &[u8]) -> Result<PathBuf, RenderError> {
                Err(RenderError::Write {
                    path: PathBuf::from(file_name),
                    source: std::io::Error::other("disk full"),
                })
            }
        }

        let gen = ReportGenerator::new(RecordingCanvasFactory, FailingSink, ReportConfig::default());
        let err = gen.list_report(&records(1), &ReportOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate PDF");
        assert!(matches!(err.cause(), Some(RenderError::Write { .. })));

        let err = gen
            .single_report(&record("PU-1", PickupStatus::Pending))
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate single pickup PDF");
    }

    #[test]
    fn invalid_offset_fails_before_drawing() {
        let config = ReportConfig {
            utc_offset_minutes: 100_000,
            ..Default::default()
        };
        let gen = ReportGenerator::new(RecordingCanvasFactory, MemorySink::new(), config);
        let err = gen.list_report(&[], &ReportOptions::default()).unwrap_err();
        assert!(matches!(err.cause(), Some(RenderError::Config(_))));
    }

    #[test]
    fn pdf_generator_writes_real_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let gen = ReportGenerator::pdf(tmp.path(), ReportConfig::default())
            .with_fixed_time(fixed_now());
        let out = gen.list_report(&records(50), &ReportOptions::default()).unwrap();

        assert_eq!(out.path, tmp.path().join("pickup-list-2024-03-05.pdf"));
        assert_eq!(out.page_count, 2);
        let bytes = std::fs::read(&out.path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(bytes.len(), out.size_bytes);
    }

    #[test]
    fn pdf_output_is_byte_stable_for_fixed_time() {
        let render = || {
            let tmp = tempfile::tempdir().unwrap();
            let gen = ReportGenerator::pdf(tmp.path(), ReportConfig::default())
                .with_fixed_time(fixed_now());
            let list = gen.list_report(&records(45), &ReportOptions::default()).unwrap();
            let single = gen
                .single_report(&record("PU-42", PickupStatus::Completed))
                .unwrap();
            (
                std::fs::read(list.path).unwrap(),
                std::fs::read(single.path).unwrap(),
            )
        };
        let (list_a, single_a) = render();
        let (list_b, single_b) = render();
        assert_eq!(list_a, list_b);
        assert_eq!(single_a, single_b);
    }

    #[test]
    fn unfit_page_geometry_fails_before_drawing() {
        let config = ReportConfig {
            page_height_mm: 60.0,
            ..Default::default()
        };
        let gen = ReportGenerator::new(RecordingCanvasFactory, MemorySink::new(), config);
        let err = gen.list_report(&records(3), &ReportOptions::default()).unwrap_err();
        assert!(matches!(err.cause(), Some(RenderError::Config(_))));
        assert!(gen.sink().file_names().is_empty());
    }
}
