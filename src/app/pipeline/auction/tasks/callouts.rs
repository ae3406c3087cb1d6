use crate::app::pipeline::auction::context::AuctionContext;
use crate::core::demand::dispatch::Dispatcher;
use crate::core::pipeline::AsyncTask;
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::Instrument;

/// Fans the canonical request out to every surviving candidate and
/// collects their replies onto the context. The dispatcher owns the
/// deadline math, this task just wires it up
pub struct BidderCalloutsTask {
    dispatcher: Arc<Dispatcher>,
}

impl BidderCalloutsTask {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        BidderCalloutsTask { dispatcher }
    }

    async fn run0(&self, context: &AuctionContext) -> Result<(), Error> {
        let req = context
            .bid_request
            .read()
            .clone()
            .ok_or_else(|| anyhow!("callouts before request build"))?;

        let candidates = context.candidates.lock().clone();

        let replies = self
            .dispatcher
            .dispatch(&req, &candidates, context.tmax(), context.started)
            .await;

        context.replies.lock().extend(replies);

        Ok(())
    }
}

#[async_trait]
impl AsyncTask<AuctionContext, Error> for BidderCalloutsTask {
    async fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let span = crate::child_span_info!("bidder_callouts_task");

        self.run0(context).instrument(span).await
    }
}
