use crate::core::models::auction::{AuctionResult, RankedBid, AUCTION_TYPE_FIRST_PRICE};
use crate::core::models::deal::Deal;
use crate::core::models::partner::Partner;
use crate::core::models::placement::Size;
use crate::core::openrtb::BidResponse;
use std::sync::Arc;
use tracing::debug;

/// Everything the clearing pass needs to judge a bid. Floors are the
/// effective values already sent on the wire, so admission here and
/// what partners were told to beat stay consistent
pub struct AuctionTerms<'a> {
    /// Effective open-auction floor in USD CPM
    pub floor: f64,
    pub auction_type: i32,
    /// Present when the request carried a deal id. Only bids echoing
    /// the id and matching the deal targeting are admitted
    pub deal: Option<&'a Deal>,
    /// Floor sent on the pmp deal object
    pub deal_floor: f64,
    pub size: Option<Size>,
    pub device: Option<&'a str>,
    pub geo: Option<&'a str>,
    /// Blocked advertiser domains
    pub badv: &'a [String],
    /// Fraction of the cleared price paid out to the publisher
    pub rev_share: f64,
}

/// Runs the auction over collected partner responses: flatten every
/// seatbid, filter by floor and deal constraints, rank, and compute
/// the cleared price. Returns None when nothing is admitted
pub fn run_auction(
    responses: &[(Arc<Partner>, BidResponse)],
    terms: &AuctionTerms,
) -> Option<AuctionResult> {
    let mut admitted: Vec<RankedBid> = Vec::new();

    for (partner, response) in responses {
        for seatbid in &response.seatbid {
            for bid in &seatbid.bid {
                if let Some(reason) = rejection_reason(bid, terms) {
                    debug!(partner = %partner.id, bid = %bid.id, reason, "bid rejected");
                    continue;
                }

                admitted.push(RankedBid {
                    partner: partner.clone(),
                    seat: seatbid.seat.clone(),
                    bid: bid.clone(),
                });
            }
        }
    }

    if admitted.is_empty() {
        return None;
    }

    rank_bids(&mut admitted);

    let cleared_price = clearing_price(&admitted, terms);
    let publisher_revenue = cleared_price * terms.rev_share;

    Some(AuctionResult {
        auction_type: terms.auction_type,
        ranked: admitted,
        cleared_price,
        publisher_revenue,
    })
}

fn rejection_reason(bid: &crate::core::openrtb::Bid, terms: &AuctionTerms) -> Option<&'static str> {
    if let Some(deal) = terms.deal {
        if bid.dealid.as_deref() != Some(deal.id.as_str()) {
            return Some("deal id mismatch");
        }

        if !deal.matches(terms.size, terms.device, terms.geo) {
            return Some("deal targeting mismatch");
        }

        if bid.price < terms.deal_floor {
            return Some("below deal floor");
        }
    } else if bid.price < terms.floor {
        // inclusive comparison, a bid exactly at the floor is admitted
        return Some("below floor");
    }

    if !terms.badv.is_empty() && bid.adomain.iter().any(|d| terms.badv.contains(d)) {
        return Some("blocked advertiser domain");
    }

    None
}

/// Descending price, deterministic tie-break by partner id then bid id
fn rank_bids(bids: &mut [RankedBid]) {
    bids.sort_by(|a, b| {
        b.bid
            .price
            .total_cmp(&a.bid.price)
            .then_with(|| a.partner.id.cmp(&b.partner.id))
            .then_with(|| a.bid.id.cmp(&b.bid.id))
    });
}

fn clearing_price(ranked: &[RankedBid], terms: &AuctionTerms) -> f64 {
    let winner = &ranked[0];

    if let Some(deal) = terms.deal {
        if winner.bid.dealid.as_deref() == Some(deal.id.as_str()) {
            // deals are fixed-price agreements, they clear at the bid
            return terms.deal_floor.max(winner.bid.price);
        }
    }

    if terms.auction_type == AUCTION_TYPE_FIRST_PRICE {
        return winner.bid.price;
    }

    if ranked.len() == 1 {
        return terms.floor;
    }

    terms.floor.max(ranked[1].bid.price)
}
