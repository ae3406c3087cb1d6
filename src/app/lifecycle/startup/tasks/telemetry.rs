use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::AsyncTask;
use crate::core::telemetry::TelemetrySink;
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Connects the analytics sink. Unlike the catalog this is not load
/// bearing, a refused connection degrades to no-op logging
pub struct TelemetryInitTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for TelemetryInitTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx
            .config
            .get()
            .ok_or_else(|| anyhow!("config missing during telemetry init"))?;

        let sink = match (&config.analytics_url, config.analytics_enabled) {
            (Some(url), true) => match TelemetrySink::connect(url).await {
                Ok(sink) => {
                    info!(url = %url, "telemetry sink connected");
                    sink
                }
                Err(e) => {
                    warn!(error = %e, "telemetry sink unreachable, degrading to no-op");
                    TelemetrySink::disabled()
                }
            },
            _ => {
                info!("analytics disabled");
                TelemetrySink::disabled()
            }
        };

        ctx.telemetry
            .set(Arc::new(sink))
            .map_err(|_| anyhow!("telemetry already initialized"))?;

        Ok(())
    }
}
