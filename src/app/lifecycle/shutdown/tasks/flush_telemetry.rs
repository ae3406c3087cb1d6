use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::AsyncTask;
use anyhow::Error;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Gives the telemetry writer one more flush window before the
/// process exits, so records from the final requests ship
pub struct FlushTelemetryTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for FlushTelemetryTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        if let Some(telemetry) = ctx.telemetry.get() {
            if telemetry.enabled() {
                tokio::time::sleep(Duration::from_millis(700)).await;
                debug!("telemetry flush window elapsed");
            }
        }

        Ok(())
    }
}
