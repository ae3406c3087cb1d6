use crate::app::lifecycle::context::StartupContext;
use crate::core::managers::PartnerManager;
use crate::core::pipeline::AsyncTask;
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub struct PartnersLoadTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for PartnersLoadTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx
            .config
            .get()
            .ok_or_else(|| anyhow!("config missing during partner load"))?;

        if config.partners.is_empty() {
            warn!("no demand partners registered, every auction will no-bid");
        }

        let manager = PartnerManager::new(config.partners.clone());
        info!(partners = manager.active().len(), "partner registry loaded");

        ctx.partners
            .set(Arc::new(manager))
            .map_err(|_| anyhow!("partners already loaded"))?;

        Ok(())
    }
}
