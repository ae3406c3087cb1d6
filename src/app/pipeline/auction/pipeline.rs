use crate::app::config::SspConfig;
use crate::app::pipeline::auction::{tasks, AuctionContext};
use crate::core::catalog::manager::CatalogManager;
use crate::core::demand::dispatch::Dispatcher;
use crate::core::demand::notices::{NoticeCache, Notifier};
use crate::core::managers::PartnerManager;
use crate::core::pipeline::{AsyncTask, Pipeline, PipelineBuilder};
use crate::core::telemetry::TelemetrySink;
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, Instrument};

fn build_rtb_pipeline(
    config: &SspConfig,
    catalog: Arc<CatalogManager>,
    partners: Arc<PartnerManager>,
    dispatcher: Arc<Dispatcher>,
    notices: Arc<NoticeCache>,
    notifier: Arc<Notifier>,
) -> Result<Pipeline<AuctionContext, Error>, Error> {
    PipelineBuilder::new()
        .with_blocking(Box::new(tasks::CatalogLookupTask::new(catalog)))
        .with_blocking(Box::new(tasks::FloorsTask::new(config.auction_floor)))
        .with_blocking(Box::new(tasks::BuildRequestTask))
        .with_blocking(Box::new(tasks::SchainAppendTask::new(
            config.ssp_id.clone(),
            None,
        )))
        .with_blocking(Box::new(tasks::PartnerMatchingTask::new(partners.clone())))
        .with_blocking(Box::new(tasks::QpsLimiterTask::new(partners)))
        .with_async(Box::new(tasks::BidderCalloutsTask::new(dispatcher)))
        .with_blocking(Box::new(tasks::ClearingTask))
        .with_blocking(Box::new(tasks::NoticesTask::new(notices, notifier)))
        .build()
        .ok_or_else(|| anyhow!("auction pipeline built empty"))
}

/// The auction stages plus the finalizer tasks which must always
/// run, whether or not the auction pipeline completed. Telemetry
/// wants a record of aborted auctions too
struct AuctionAndFinalizersTask {
    rtb_pipeline: Pipeline<AuctionContext, Error>,
    finalizers: Pipeline<AuctionContext, Error>,
}

impl AuctionAndFinalizersTask {
    async fn run0(&self, context: &AuctionContext) -> Result<(), Error> {
        let auction_result = self.rtb_pipeline.run(context).await;

        match &auction_result {
            Ok(_) => debug!("auction pipeline complete"),
            Err(e) => debug!(error = %e, "auction pipeline aborted"),
        }

        self.finalizers.run(context).await?;

        auction_result
    }
}

#[async_trait]
impl AsyncTask<AuctionContext, Error> for AuctionAndFinalizersTask {
    async fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let span = crate::child_span_info!("auction_pipeline");

        self.run0(context).instrument(span).await
    }
}

/// Builds the full request pipeline every ingress adapter feeds into
pub fn build_auction_pipeline(
    config: &SspConfig,
    catalog: Arc<CatalogManager>,
    partners: Arc<PartnerManager>,
    dispatcher: Arc<Dispatcher>,
    notices: Arc<NoticeCache>,
    notifier: Arc<Notifier>,
    telemetry: Arc<TelemetrySink>,
) -> Result<Pipeline<AuctionContext, Error>, Error> {
    let rtb_pipeline = build_rtb_pipeline(
        config, catalog, partners, dispatcher, notices, notifier,
    )?;

    let finalizers = PipelineBuilder::new()
        .with_blocking(Box::new(tasks::RecordAuctionTask::new(telemetry)))
        .build()
        .ok_or_else(|| anyhow!("finalizer pipeline built empty"))?;

    PipelineBuilder::new()
        .with_async(Box::new(AuctionAndFinalizersTask {
            rtb_pipeline,
            finalizers,
        }))
        .build()
        .ok_or_else(|| anyhow!("auction pipeline built empty"))
}
