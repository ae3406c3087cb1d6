use crate::app::pipeline::auction::context::AuctionContext;
use crate::core::demand::notices::{NoticeCache, Notifier, PendingNotice};
use crate::core::pipeline::BlockingTask;
use anyhow::{anyhow, Error};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Settles the win side of a cleared auction: mints the exchange bid
/// event id, fires the partner's win notice with the cleared price,
/// and parks the billing notice until the impression pixel lands
pub struct NoticesTask {
    cache: Arc<NoticeCache>,
    notifier: Arc<Notifier>,
}

impl NoticesTask {
    pub fn new(cache: Arc<NoticeCache>, notifier: Arc<Notifier>) -> Self {
        NoticesTask { cache, notifier }
    }
}

impl BlockingTask<AuctionContext, Error> for NoticesTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let result = match context.result() {
            Some(result) => result,
            // nothing won, nothing to notify
            None => return Ok(()),
        };

        let resolved = context
            .resolved
            .get()
            .ok_or_else(|| anyhow!("notices before catalog lookup"))?;

        let event_id = Uuid::new_v4().to_string();
        let winner = result.winner();

        self.cache.insert(
            &event_id,
            PendingNotice {
                auction_id: context.auction_id.clone(),
                partner_id: winner.partner.id.clone(),
                publisher_id: resolved.publisher.id.clone(),
                placement_id: resolved.placement.id.clone(),
                deal_id: winner.bid.dealid.clone(),
                burl: winner.bid.burl.clone(),
                cleared_price: result.cleared_price,
                publisher_revenue: result.publisher_revenue,
            },
        );

        // win notice fires on clearance, billing waits for the pixel
        if let Some(nurl) = &winner.bid.nurl {
            self.notifier.fire(nurl, result.cleared_price);
        }

        debug!(event = %event_id, "win settled");

        context
            .event_id
            .set(event_id)
            .map_err(|_| anyhow!("event id already minted"))?;

        Ok(())
    }
}
