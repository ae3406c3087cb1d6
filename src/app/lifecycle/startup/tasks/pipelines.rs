use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::auction::build_auction_pipeline;
use crate::app::pipeline::events::build_tracking_pipeline;
use crate::app::state::ServiceState;
use crate::core::demand::dispatch::Dispatcher;
use crate::core::demand::notices::{NoticeCache, Notifier};
use crate::core::pipeline::AsyncTask;
use crate::core::sellers::SellersCache;
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use std::sync::Arc;

/// Assembles the request pipelines and the handler dependency set.
/// Everything a handler touches is wired here, explicitly
pub struct BuildPipelinesTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for BuildPipelinesTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx
            .config
            .get()
            .ok_or_else(|| anyhow!("config missing during pipeline build"))?
            .clone();
        let catalog = ctx
            .catalog
            .get()
            .ok_or_else(|| anyhow!("catalog missing during pipeline build"))?
            .clone();
        let partners = ctx
            .partners
            .get()
            .ok_or_else(|| anyhow!("partners missing during pipeline build"))?
            .clone();
        let telemetry = ctx
            .telemetry
            .get()
            .ok_or_else(|| anyhow!("telemetry missing during pipeline build"))?
            .clone();

        let dispatcher = Arc::new(Dispatcher::new(&config.ssp_id)?);
        let notices = Arc::new(NoticeCache::new(config.notice_ttl));
        let notifier = Arc::new(Notifier::new()?);

        let auction_pipeline = build_auction_pipeline(
            &config,
            catalog.clone(),
            partners,
            dispatcher,
            notices.clone(),
            notifier.clone(),
            telemetry.clone(),
        )?;

        let tracking_pipeline = build_tracking_pipeline(notices, notifier, telemetry)?;

        let sellers = Arc::new(SellersCache::new(
            catalog.clone(),
            config.contact_email.clone(),
            config.sellers_ttl,
        ));

        let state = ServiceState {
            config,
            catalog,
            sellers,
            auction_pipeline: Arc::new(auction_pipeline),
            tracking_pipeline: Arc::new(tracking_pipeline),
        };

        ctx.state
            .set(Arc::new(state))
            .map_err(|_| anyhow!("service state already built"))?;

        Ok(())
    }
}
