use crate::app::config::SspConfig;
use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::AsyncTask;
use anyhow::{anyhow, Context, Error};
use async_trait::async_trait;
use std::sync::Arc;

/// Reads process configuration from the environment. First task in
/// the pipeline, everything downstream depends on it
pub struct ConfigLoadTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for ConfigLoadTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = SspConfig::load().context("failed loading configuration")?;

        ctx.config
            .set(Arc::new(config))
            .map_err(|_| anyhow!("config already loaded"))?;

        Ok(())
    }
}
