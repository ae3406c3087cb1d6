use crate::core::catalog::ResolvedPlacement;
use crate::core::demand::dispatch::PartnerReply;
use crate::core::models::adrequest::AdRequest;
use crate::core::models::auction::AuctionResult;
use crate::core::models::deal::Deal;
use crate::core::models::partner::Partner;
use crate::core::openrtb::BidRequest;
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Final disposition of an auction, set exactly once
#[derive(Debug)]
pub enum AuctionOutcome {
    Result(AuctionResult),
    NoBid { nbr: u32, desc: Option<&'static str> },
}

/// Carries one auction through the pipeline. The inbound projection
/// is immutable, everything derived lives behind interior mutability
/// so tasks share the context by reference
///
/// # Arguments
/// * `request` - The canonical ingress projection
/// * `bid_request` - The outbound OpenRTB request. Pre-populated for
///   direct OpenRTB ingress, built by the builder stage otherwise
/// * `res` - The final [`AuctionOutcome`], a winner or a no-bid
pub struct AuctionContext {
    pub request: AdRequest,
    pub auction_id: String,
    pub started: Instant,
    pub default_tmax: Duration,
    pub tmax: OnceLock<Duration>,
    pub auction_type: OnceLock<i32>,
    pub resolved: OnceLock<ResolvedPlacement>,
    pub deal: OnceLock<Option<Arc<Deal>>>,
    /// Effective open-auction floor sent on the wire
    pub floor: OnceLock<f64>,
    pub deal_floor: OnceLock<f64>,
    pub bid_request: RwLock<Option<BidRequest>>,
    pub candidates: Mutex<Vec<Arc<Partner>>>,
    pub replies: Mutex<Vec<PartnerReply>>,
    pub res: OnceLock<AuctionOutcome>,
    /// Exchange bid event id minted for the winner, keys the
    /// tracking urls
    pub event_id: OnceLock<String>,
}

impl AuctionContext {
    pub fn new(
        request: AdRequest,
        inbound: Option<BidRequest>,
        default_tmax: Duration,
    ) -> AuctionContext {
        AuctionContext {
            request,
            auction_id: Uuid::new_v4().to_string(),
            started: Instant::now(),
            default_tmax,
            tmax: OnceLock::new(),
            auction_type: OnceLock::new(),
            resolved: OnceLock::new(),
            deal: OnceLock::new(),
            floor: OnceLock::new(),
            deal_floor: OnceLock::new(),
            bid_request: RwLock::new(inbound),
            candidates: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
            res: OnceLock::new(),
            event_id: OnceLock::new(),
        }
    }

    pub fn tmax(&self) -> Duration {
        *self.tmax.get().unwrap_or(&self.default_tmax)
    }

    /// The winning result, if the auction cleared
    pub fn result(&self) -> Option<&AuctionResult> {
        match self.res.get() {
            Some(AuctionOutcome::Result(result)) => Some(result),
            _ => None,
        }
    }
}
