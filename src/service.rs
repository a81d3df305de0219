//! Async front for the report generator.
//!
//! Layout and serialization are CPU-bound and the file write is blocking, so
//! each report runs on tokio's blocking pool. The canvas is created inside
//! the blocking task and never crosses threads.

use std::sync::Arc;

use crate::canvas::CanvasFactory;
use crate::error::ReportError;
use crate::export::ReportSink;
use crate::models::{PickupRecord, ReportOptions};
use crate::report::{ReportGenerator, ReportOutput};
use crate::snapshot::VisualSnapshot;

pub struct ReportService<F, S> {
    generator: Arc<ReportGenerator<F, S>>,
}

impl<F, S> Clone for ReportService<F, S> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<F, S> ReportService<F, S>
where
    F: CanvasFactory + Send + Sync + 'static,
    S: ReportSink + Send + Sync + 'static,
{
    pub fn new(generator: ReportGenerator<F, S>) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    pub fn generator(&self) -> &ReportGenerator<F, S> {
        &self.generator
    }

    pub async fn list_report(
        &self,
        records: Vec<PickupRecord>,
        options: ReportOptions,
    ) -> Result<ReportOutput, ReportError> {
        let generator = Arc::clone(&self.generator);
        tokio::task::spawn_blocking(move || generator.list_report(&records, &options)).await?
    }

    pub async fn single_report(&self, record: PickupRecord) -> Result<ReportOutput, ReportError> {
        let generator = Arc::clone(&self.generator);
        tokio::task::spawn_blocking(move || generator.single_report(&record)).await?
    }

    pub async fn snapshot_report<V>(
        &self,
        source: Arc<V>,
        target_id: String,
        file_name: Option<String>,
    ) -> Result<ReportOutput, ReportError>
    where
        V: VisualSnapshot + Send + Sync + 'static + ?Sized,
    {
        let generator = Arc::clone(&self.generator);
        tokio::task::spawn_blocking(move || {
            generator.snapshot_report(source.as_ref(), &target_id, file_name.as_deref())
        })
        .await?
    }
}
