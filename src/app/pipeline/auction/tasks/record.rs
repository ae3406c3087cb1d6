use crate::app::pipeline::auction::context::AuctionContext;
use crate::core::demand::dispatch::Outcome;
use crate::core::pipeline::BlockingTask;
use crate::core::telemetry::records::{stamp, BidRecord, RequestRecord};
use crate::core::telemetry::{TelemetryRecord, TelemetrySink};
use anyhow::Error;
use std::sync::Arc;
use tracing::debug;

/// Appends the request and per-partner bid records. Runs as a
/// finalizer so even aborted auctions leave a trail
pub struct RecordAuctionTask {
    telemetry: Arc<TelemetrySink>,
}

impl RecordAuctionTask {
    pub fn new(telemetry: Arc<TelemetrySink>) -> Self {
        RecordAuctionTask { telemetry }
    }
}

impl BlockingTask<AuctionContext, Error> for RecordAuctionTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let (ts, date) = stamp();

        let publisher_id = context
            .resolved
            .get()
            .map(|resolved| resolved.publisher.id.clone())
            .unwrap_or_default();

        // site-addressed ingress arrives with no placement id, the
        // resolved one is authoritative either way
        let placement_id = context
            .resolved
            .get()
            .map(|resolved| resolved.placement.id.clone())
            .unwrap_or_else(|| context.request.placement_id.clone());

        self.telemetry.append(TelemetryRecord::Request(RequestRecord {
            ts,
            date: date.clone(),
            auction_id: context.auction_id.clone(),
            placement_id,
            publisher_id,
            ingress: context.request.ingress.to_string(),
            deal_id: context.request.deal_id.clone(),
            at: context.result().map(|result| result.auction_type),
        }));

        let winner_id = context
            .result()
            .map(|result| result.winner().partner.id.clone());

        for reply in context.replies.lock().iter() {
            let (outcome, price) = match &reply.outcome {
                Outcome::Bid(response) => {
                    let top = response
                        .seatbid
                        .iter()
                        .flat_map(|seatbid| seatbid.bid.iter())
                        .map(|bid| bid.price)
                        .fold(f64::MIN, f64::max);

                    ("bid", (top > f64::MIN).then_some(top))
                }
                Outcome::NoBid => ("no_bid", None),
                Outcome::Error(_) => ("error", None),
                Outcome::Timeout => ("timeout", None),
                Outcome::Skipped(reason) => {
                    debug!(partner = %reply.partner.id, reason, "partner skipped");
                    ("skipped", None)
                }
            };

            self.telemetry.append(TelemetryRecord::Bid(BidRecord {
                ts,
                date: date.clone(),
                auction_id: context.auction_id.clone(),
                partner_id: reply.partner.id.clone(),
                outcome: outcome.to_string(),
                price,
                elapsed_ms: reply.elapsed.as_millis() as u64,
                won: winner_id.as_deref() == Some(reply.partner.id.as_str()),
            }));
        }

        Ok(())
    }
}
