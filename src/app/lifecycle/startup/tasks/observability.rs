use crate::app::lifecycle::context::StartupContext;
use crate::core::observability::provider;
use crate::core::pipeline::AsyncTask;
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use tracing::info;

pub struct ObservabilityInitTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for ObservabilityInitTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx
            .config
            .get()
            .ok_or_else(|| anyhow!("config missing during observability init"))?;

        let guard = provider::init(&config.logging)?;
        *ctx.log_guard.lock() = guard;

        info!(level = %config.logging.level, "logging initialized");

        Ok(())
    }
}
