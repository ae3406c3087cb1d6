use crate::app::lifecycle::context::StartupContext;
use crate::app::lifecycle::startup::tasks;
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use anyhow::Error;

/// Startup runs as a pipeline so each concern stays its own task
/// and ordering reads off the builder. Any task failing aborts boot
pub fn build_start_pipeline() -> Pipeline<StartupContext, Error> {
    PipelineBuilder::new()
        .with_async(Box::new(tasks::ConfigLoadTask))
        .with_async(Box::new(tasks::ObservabilityInitTask))
        .with_async(Box::new(tasks::CatalogLoadTask))
        .with_async(Box::new(tasks::PartnersLoadTask))
        .with_async(Box::new(tasks::TelemetryInitTask))
        .with_async(Box::new(tasks::BuildPipelinesTask))
        .with_async(Box::new(tasks::StartServerTask))
        .build()
        .expect("Startup pipeline should have tasks")
}
