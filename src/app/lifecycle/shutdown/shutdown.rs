use crate::app::lifecycle::context::StartupContext;
use crate::app::lifecycle::shutdown::tasks;
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use anyhow::Error;

pub fn build_shutdown_pipeline() -> Pipeline<StartupContext, Error> {
    PipelineBuilder::new()
        .with_async(Box::new(tasks::StopServerTask))
        .with_async(Box::new(tasks::FlushTelemetryTask))
        .build()
        .expect("Shutdown pipeline should have tasks")
}
