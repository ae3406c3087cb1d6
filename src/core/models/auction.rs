use crate::core::models::partner::Partner;
use crate::core::openrtb::Bid;
use std::sync::Arc;

pub const AUCTION_TYPE_FIRST_PRICE: i32 = 1;
pub const AUCTION_TYPE_SECOND_PRICE: i32 = 2;

/// A bid tagged with the partner that produced it
#[derive(Debug, Clone)]
pub struct RankedBid {
    pub partner: Arc<Partner>,
    pub seat: Option<String>,
    pub bid: Bid,
}

/// Outcome of a cleared auction. `ranked[0]` is the winner
#[derive(Debug, Clone)]
pub struct AuctionResult {
    pub auction_type: i32,
    pub ranked: Vec<RankedBid>,
    /// Price the winner pays, in USD CPM
    pub cleared_price: f64,
    /// `cleared_price` x publisher rev share
    pub publisher_revenue: f64,
}

impl AuctionResult {
    pub fn winner(&self) -> &RankedBid {
        &self.ranked[0]
    }
}
