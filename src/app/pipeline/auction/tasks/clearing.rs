use crate::app::pipeline::auction::context::{AuctionContext, AuctionOutcome};
use crate::core::auction::{run_auction, AuctionTerms};
use crate::core::demand::dispatch::Outcome;
use crate::core::models::auction::AUCTION_TYPE_SECOND_PRICE;
use crate::core::models::partner::Partner;
use crate::core::openrtb::BidResponse;
use crate::core::pipeline::BlockingTask;
use crate::core::spec::nobidreasons;
use anyhow::{anyhow, Error};
use std::sync::Arc;
use tracing::debug;

/// Runs the clearing pass over collected replies and assigns the
/// final outcome. An empty admitted set is the common hot path and
/// stays at debug
pub struct ClearingTask;

impl BlockingTask<AuctionContext, Error> for ClearingTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let resolved = context
            .resolved
            .get()
            .ok_or_else(|| anyhow!("clearing before catalog lookup"))?;

        let replies = context.replies.lock();

        let responses: Vec<(Arc<Partner>, BidResponse)> = replies
            .iter()
            .filter_map(|reply| match &reply.outcome {
                Outcome::Bid(response) => Some((reply.partner.clone(), response.clone())),
                _ => None,
            })
            .collect();

        let deal = context.deal.get().cloned().flatten();
        let size = context.request.size();
        let geo = context.request.geo_country.clone();

        let terms = AuctionTerms {
            floor: *context.floor.get().ok_or_else(|| anyhow!("floor missing"))?,
            auction_type: *context
                .auction_type
                .get()
                .unwrap_or(&AUCTION_TYPE_SECOND_PRICE),
            deal: deal.as_deref(),
            deal_floor: *context.deal_floor.get().unwrap_or(&0.0),
            size,
            device: Some(context.request.device_class()),
            geo: geo.as_deref(),
            badv: &resolved.placement.badv,
            rev_share: resolved.publisher.rev_share,
        };

        let outcome = match run_auction(&responses, &terms) {
            Some(result) => {
                debug!(
                    winner = %result.winner().partner.id,
                    cleared = result.cleared_price,
                    "auction cleared"
                );
                AuctionOutcome::Result(result)
            }
            None => {
                debug!("no admitted bids");
                AuctionOutcome::NoBid {
                    nbr: nobidreasons::NO_BIDS_RECEIVED,
                    desc: Some("No bids received"),
                }
            }
        };

        drop(replies);

        context
            .res
            .set(outcome)
            .map_err(|_| anyhow!("outcome already set before clearing"))?;

        Ok(())
    }
}
