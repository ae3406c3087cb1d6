use crate::app::pipeline::auction::context::{AuctionContext, AuctionOutcome};
use crate::core::catalog::manager::CatalogManager;
use crate::core::pipeline::BlockingTask;
use crate::core::spec::nobidreasons;
use anyhow::{anyhow, bail, Error};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Resolves the placement through the catalog snapshot and pins the
/// resolved records on the context. SSAI callers address a site, so
/// their lookup goes through the site's video placement instead
pub struct CatalogLookupTask {
    catalog: Arc<CatalogManager>,
}

impl CatalogLookupTask {
    pub fn new(catalog: Arc<CatalogManager>) -> Self {
        CatalogLookupTask { catalog }
    }
}

impl BlockingTask<AuctionContext, Error> for CatalogLookupTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let catalog = self.catalog.catalog();

        // site-addressed ingress (SSAI and Publica VAST) resolves to
        // the site's video placement
        let resolved = if context.request.placement_id.is_empty() {
            context
                .request
                .site_id
                .as_deref()
                .and_then(|site_id| catalog.video_placement_for_site(site_id))
        } else {
            catalog.resolve(&context.request.placement_id)
        };

        let resolved = match resolved {
            Some(resolved) => resolved,
            None => {
                debug!(placement = %context.request.placement_id, "placement not found");

                context
                    .res
                    .set(AuctionOutcome::NoBid {
                        nbr: nobidreasons::UNKNOWN_PLACEMENT,
                        desc: Some("Unknown placement"),
                    })
                    .map_err(|_| anyhow!("outcome already set during lookup"))?;

                bail!("catalog miss for placement {}", context.request.placement_id);
            }
        };

        if !resolved.placement.active || !resolved.site.active || !resolved.publisher.active {
            context
                .res
                .set(AuctionOutcome::NoBid {
                    nbr: nobidreasons::SELLER_DISABLED,
                    desc: Some("Seller disabled"),
                })
                .map_err(|_| anyhow!("outcome already set during lookup"))?;

            bail!("placement {} chain is disabled", resolved.placement.id);
        }

        // a request pinned to a deal is only serviceable while the
        // deal is live
        let deal = match &context.request.deal_id {
            Some(deal_id) => match catalog.deal(deal_id) {
                Some(deal) if deal.is_live(Utc::now()) => Some(deal),
                _ => {
                    debug!(deal = %deal_id, "deal unknown or not live");

                    context
                        .res
                        .set(AuctionOutcome::NoBid {
                            nbr: nobidreasons::NO_BIDS_RECEIVED,
                            desc: Some("Deal not available"),
                        })
                        .map_err(|_| anyhow!("outcome already set during lookup"))?;

                    bail!("deal {} unknown or not live", deal_id);
                }
            },
            None => None,
        };

        context
            .resolved
            .set(resolved)
            .map_err(|_| anyhow!("placement already resolved"))?;

        context
            .deal
            .set(deal)
            .map_err(|_| anyhow!("deal already resolved"))?;

        Ok(())
    }
}
