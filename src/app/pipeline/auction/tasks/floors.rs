use crate::app::pipeline::auction::context::AuctionContext;
use crate::core::pipeline::BlockingTask;
use anyhow::{anyhow, Error};
use tracing::debug;

/// Computes the effective floors once so the builder, the wire and
/// the clearing pass all agree on them.
///
/// The caller override can only raise the placement floor, never
/// lower it, and the global floor sits underneath both
pub struct FloorsTask {
    global_floor: f64,
}

impl FloorsTask {
    pub fn new(global_floor: f64) -> Self {
        FloorsTask { global_floor }
    }
}

impl BlockingTask<AuctionContext, Error> for FloorsTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let resolved = context
            .resolved
            .get()
            .ok_or_else(|| anyhow!("floors computed before catalog lookup"))?;

        let placement_floor = resolved.placement.floor_price;
        let request_floor = context.request.floor.unwrap_or(0.0);

        let floor = placement_floor.max(request_floor).max(self.global_floor);
        let deal_floor = placement_floor.max(request_floor);

        debug!(floor, deal_floor, "effective floors");

        context
            .floor
            .set(floor)
            .map_err(|_| anyhow!("floor already set"))?;
        context
            .deal_floor
            .set(deal_floor)
            .map_err(|_| anyhow!("deal floor already set"))?;

        Ok(())
    }
}
