use crate::app::pipeline::auction::context::{AuctionContext, AuctionOutcome};
use crate::core::managers::PartnerManager;
use crate::core::pipeline::BlockingTask;
use crate::core::spec::nobidreasons;
use anyhow::{anyhow, bail, Error};
use std::sync::Arc;
use tracing::debug;

/// Snapshots the active partner set for this auction. Membership is
/// frozen here, registry changes never land mid flight
pub struct PartnerMatchingTask {
    partners: Arc<PartnerManager>,
}

impl PartnerMatchingTask {
    pub fn new(partners: Arc<PartnerManager>) -> Self {
        PartnerMatchingTask { partners }
    }
}

impl BlockingTask<AuctionContext, Error> for PartnerMatchingTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let active = self.partners.active();

        if active.is_empty() {
            context
                .res
                .set(AuctionOutcome::NoBid {
                    nbr: nobidreasons::NO_PARTNERS_MATCHED,
                    desc: Some("No demand partners"),
                })
                .map_err(|_| anyhow!("outcome already set during matching"))?;

            bail!("no active demand partners configured");
        }

        debug!(partners = active.len(), "matched demand partners");

        *context.candidates.lock() = active.as_ref().clone();

        Ok(())
    }
}
