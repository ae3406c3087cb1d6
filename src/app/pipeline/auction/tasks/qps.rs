use crate::app::pipeline::auction::context::{AuctionContext, AuctionOutcome};
use crate::core::demand::dispatch::{Outcome, PartnerReply};
use crate::core::managers::PartnerManager;
use crate::core::pipeline::BlockingTask;
use crate::core::spec::nobidreasons;
use anyhow::{anyhow, bail, Error};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sheds partners whose QPS budget is exhausted. A shed partner is
/// recorded as skipped, never as an error, and the auction proceeds
/// with whoever is left
pub struct QpsLimiterTask {
    partners: Arc<PartnerManager>,
}

impl QpsLimiterTask {
    pub fn new(partners: Arc<PartnerManager>) -> Self {
        QpsLimiterTask { partners }
    }
}

impl BlockingTask<AuctionContext, Error> for QpsLimiterTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let mut candidates = context.candidates.lock();
        let mut replies = context.replies.lock();

        let mut allowed = Vec::with_capacity(candidates.len());
        for partner in candidates.drain(..) {
            if self.partners.allow(&partner.id) {
                allowed.push(partner);
                continue;
            }

            debug!(partner = %partner.id, "shed for QPS");
            replies.push(PartnerReply {
                partner,
                outcome: Outcome::Skipped("qps throttled"),
                elapsed: Duration::ZERO,
            });
        }

        let shed_everything = allowed.is_empty();
        *candidates = allowed;

        if shed_everything {
            drop(candidates);
            drop(replies);

            context
                .res
                .set(AuctionOutcome::NoBid {
                    nbr: nobidreasons::THROTTLED_PARTNER_QPS,
                    desc: Some("Demand QPS saturated"),
                })
                .map_err(|_| anyhow!("outcome already set during qps shed"))?;

            bail!("every partner was shed for QPS");
        }

        Ok(())
    }
}
