use crate::app::lifecycle::context::StartupContext;
use crate::core::catalog::manager::CatalogManager;
use crate::core::catalog::provider;
use crate::core::pipeline::AsyncTask;
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Initial catalog load plus the background refresh loop. A store
/// we cannot reach at startup is fatal, the process exits non-zero
pub struct CatalogLoadTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for CatalogLoadTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx
            .config
            .get()
            .ok_or_else(|| anyhow!("config missing during catalog load"))?;

        let provider = provider::provider_for(&config.database_url)?;
        let manager = Arc::new(CatalogManager::load(provider).await?);

        manager.spawn_refresh(config.catalog_refresh);

        info!("catalog loaded, refresh every {:?}", config.catalog_refresh);

        ctx.catalog
            .set(manager)
            .map_err(|_| anyhow!("catalog already loaded"))?;

        Ok(())
    }
}
