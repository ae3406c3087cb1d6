use crate::core::demand::client::DemandClient;
use crate::core::demand::flavor::Transports;
use crate::core::models::partner::Partner;
use crate::core::openrtb::{BidRequest, BidResponse};
use anyhow::Error;
use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Terminal state of one partner callout. Timeout and error are kept
/// distinct so telemetry can tell a slow partner from a broken one
#[derive(Debug)]
pub enum Outcome {
    Bid(BidResponse),
    NoBid,
    Error(String),
    Timeout,
    Skipped(&'static str),
}

pub struct PartnerReply {
    pub partner: Arc<Partner>,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

/// Remaining budget for a partner given its configured timeout and
/// the auction deadline residual. None means the partner is skipped.
/// A partner without a configured timeout is capped by tmax alone
pub fn effective_deadline(
    partner: &Partner,
    tmax: Duration,
    elapsed: Duration,
) -> Option<Duration> {
    let remaining = tmax.checked_sub(elapsed)?;

    if remaining.is_zero() {
        return None;
    }

    if partner.timeout_ms == 0 {
        return Some(remaining);
    }

    Some(partner.timeout().min(remaining))
}

/// Fans a bid request out to every given partner concurrently and
/// collects replies as they land. The futures are owned by the
/// caller's task, so dropping the ingress request cancels every
/// outstanding callout with it
pub struct Dispatcher {
    client: DemandClient,
    transports: Transports,
}

impl Dispatcher {
    pub fn new(ssp_id: &str) -> Result<Self, Error> {
        Ok(Dispatcher {
            client: DemandClient::new()?,
            transports: Transports::new(ssp_id),
        })
    }

    pub async fn dispatch(
        &self,
        req: &BidRequest,
        partners: &[Arc<Partner>],
        tmax: Duration,
        started: Instant,
    ) -> Vec<PartnerReply> {
        let mut replies = Vec::with_capacity(partners.len());
        let mut in_flight = FuturesUnordered::new();

        for partner in partners {
            let deadline = match effective_deadline(partner, tmax, started.elapsed()) {
                Some(deadline) => deadline,
                None => {
                    debug!(partner = %partner.id, "deadline exhausted before callout");
                    replies.push(PartnerReply {
                        partner: partner.clone(),
                        outcome: Outcome::Skipped("deadline exhausted"),
                        elapsed: Duration::ZERO,
                    });
                    continue;
                }
            };

            in_flight.push(self.call_partner(partner.clone(), req, deadline));
        }

        // each callout times itself out within the tmax residual it was
        // given, the outer clamp just guarantees we never wait past tmax
        loop {
            let remaining = tmax.saturating_sub(started.elapsed());

            match tokio::time::timeout(remaining, in_flight.next()).await {
                Ok(Some(reply)) => replies.push(reply),
                Ok(None) => break,
                Err(_) => {
                    warn!("auction deadline elapsed with callouts still pending");
                    break;
                }
            }
        }

        replies
    }

    async fn call_partner(
        &self,
        partner: Arc<Partner>,
        req: &BidRequest,
        deadline: Duration,
    ) -> PartnerReply {
        let start = Instant::now();
        let transport = self.transports.for_flavor(partner.flavor);

        let send = self.client.send(&partner, transport, req);

        // a panic inside a callout must never take the auction down,
        // it demotes to a partner failure at this boundary
        let outcome = match tokio::time::timeout(deadline, AssertUnwindSafe(send).catch_unwind())
            .await
        {
            Err(_) => Outcome::Timeout,
            Ok(Err(_)) => {
                warn!(partner = %partner.id, "callout panicked");
                Outcome::Error("callout panicked".to_string())
            }
            Ok(Ok(Ok(Some(response)))) => {
                Outcome::Bid(transport.transform_response(response, &partner))
            }
            Ok(Ok(Ok(None))) => Outcome::NoBid,
            Ok(Ok(Err(e))) => {
                debug!(partner = %partner.id, error = %e, "callout error");
                Outcome::Error(e.to_string())
            }
        };

        PartnerReply {
            partner,
            outcome,
            elapsed: start.elapsed(),
        }
    }
}
