use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::AsyncTask;
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use tracing::info;

/// Graceful stop: finish in-flight requests, take no new ones
pub struct StopServerTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for StopServerTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let handle = ctx
            .server
            .get()
            .ok_or_else(|| anyhow!("no server handle to stop"))?;

        handle.stop(true).await;
        info!("http server stopped");

        Ok(())
    }
}
