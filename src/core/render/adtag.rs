use crate::core::models::auction::AuctionResult;
use serde::Serialize;

/// Body returned to web and mobile ad tags
#[derive(Debug, Serialize)]
pub struct AdTagResponse {
    /// The winning ad markup
    pub ad: String,
    pub bid_id: String,
    /// Cleared price in USD CPM
    pub price: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adomain: Vec<String>,
}

pub fn render(result: &AuctionResult, event_id: &str) -> AdTagResponse {
    let winner = result.winner();

    AdTagResponse {
        ad: winner.bid.adm.clone().unwrap_or_default(),
        bid_id: event_id.to_string(),
        price: result.cleared_price,
        adomain: winner.bid.adomain.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::auction::{RankedBid, AUCTION_TYPE_SECOND_PRICE};
    use crate::core::models::partner::Partner;
    use crate::core::openrtb::BidBuilder;
    use std::sync::Arc;

    #[test]
    fn renders_the_winning_markup_and_cleared_price() {
        let result = AuctionResult {
            auction_type: AUCTION_TYPE_SECOND_PRICE,
            ranked: vec![RankedBid {
                partner: Arc::new(Partner::default()),
                seat: None,
                bid: BidBuilder::default()
                    .id("b1")
                    .price(2.0)
                    .adm("<div>ad</div>")
                    .adomain(vec!["brand.example".to_string()])
                    .build()
                    .unwrap(),
            }],
            cleared_price: 1.5,
            publisher_revenue: 1.2,
        };

        let body = render(&result, "ev-1");

        assert_eq!(body.ad, "<div>ad</div>");
        assert_eq!(body.bid_id, "ev-1");
        assert_eq!(body.price, 1.5);
        assert_eq!(body.adomain, vec!["brand.example".to_string()]);
    }
}
