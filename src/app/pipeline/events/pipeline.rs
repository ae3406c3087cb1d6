use crate::app::pipeline::events::context::TrackingContext;
use crate::app::pipeline::events::tasks;
use crate::core::demand::notices::{NoticeCache, Notifier};
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use crate::core::telemetry::TelemetrySink;
use anyhow::{anyhow, Error};
use std::sync::Arc;

/// Builds the pipeline behind the tracking endpoints. The http
/// response is served before this runs, so nothing here can fail
/// a beacon
pub fn build_tracking_pipeline(
    cache: Arc<NoticeCache>,
    notifier: Arc<Notifier>,
    telemetry: Arc<TelemetrySink>,
) -> Result<Pipeline<TrackingContext, Error>, Error> {
    PipelineBuilder::new()
        .with_blocking(Box::new(tasks::ExtractNoticeTask::new(cache)))
        .with_blocking(Box::new(tasks::FireBurlTask::new(notifier)))
        .with_blocking(Box::new(tasks::RecordEventTask::new(telemetry)))
        .build()
        .ok_or_else(|| anyhow!("tracking pipeline built empty"))
}
