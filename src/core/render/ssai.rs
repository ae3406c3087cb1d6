use crate::core::models::adrequest::AdRequest;
use crate::core::models::auction::AuctionResult;
use crate::core::render::vast;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Ad decision document returned to the Publica SSAI stitcher
#[derive(Debug, Serialize)]
pub struct SsaiResponse {
    pub ad_break_id: String,
    /// Total break length, the sum of ad durations in seconds
    pub duration: u32,
    pub ads: Vec<SsaiAd>,
    /// Beacon urls grouped by event name
    pub tracking_urls: BTreeMap<String, Vec<String>>,
    /// Fallback VAST endpoint mirroring this decision
    pub vast_url: String,
    pub cache_buster: String,
}

#[derive(Debug, Serialize)]
pub struct SsaiAd {
    pub id: String,
    pub duration: u32,
    pub media_url: String,
    pub click_url: String,
    pub advertiser: String,
    /// Cleared price in USD CPM
    pub cpm: f64,
}

/// Query string carrying the pub/site/content/deal identifiers of
/// the originating request, so every beacon can be attributed
fn attribution_query(req: &AdRequest) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(publisher_id) = &req.publisher_id {
        parts.push(format!("pub={publisher_id}"));
    }
    if let Some(site_id) = &req.site_id {
        parts.push(format!("site={site_id}"));
    }
    if let Some(content) = &req.content {
        parts.push(format!("content={}", content.id));
    }
    if let Some(deal_id) = &req.deal_id {
        parts.push(format!("deal={deal_id}"));
    }

    parts.join("&")
}

fn with_attribution(base: String, attribution: &str) -> String {
    if attribution.is_empty() {
        return base;
    }

    if base.contains('?') {
        format!("{base}&{attribution}")
    } else {
        format!("{base}?{attribution}")
    }
}

pub fn render(
    origin: &str,
    req: &AdRequest,
    result: &AuctionResult,
    event_id: &str,
) -> SsaiResponse {
    let winner = result.winner();
    let attribution = attribution_query(req);
    let duration = vast::bid_duration(&winner.bid);

    let ad = SsaiAd {
        id: event_id.to_string(),
        duration,
        media_url: winner.bid.adm.clone().unwrap_or_default(),
        click_url: with_attribution(
            format!("{origin}/publica/click?bid_id={event_id}"),
            &attribution,
        ),
        advertiser: winner
            .seat
            .clone()
            .or_else(|| winner.bid.adomain.first().cloned())
            .unwrap_or_else(|| winner.partner.name.clone()),
        cpm: result.cleared_price,
    };

    let mut tracking_urls = BTreeMap::new();
    tracking_urls.insert(
        "impression".to_string(),
        vec![with_attribution(
            format!("{origin}/impression/{event_id}"),
            &attribution,
        )],
    );
    tracking_urls.insert("click".to_string(), vec![ad.click_url.clone()]);

    for event in ["start", "firstQuartile", "midpoint", "thirdQuartile", "complete"] {
        tracking_urls.insert(
            event.to_string(),
            vec![with_attribution(
                format!("{origin}/publica/pixel/{event}?bid_id={event_id}"),
                &attribution,
            )],
        );
    }

    SsaiResponse {
        ad_break_id: Uuid::new_v4().to_string(),
        duration,
        ads: vec![ad],
        tracking_urls,
        vast_url: with_attribution(format!("{origin}/publica/vast"), &attribution),
        cache_buster: format!("{}", fastrand::u64(100_000_000..10_000_000_000)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::adrequest::CtvContent;
    use crate::core::models::auction::{RankedBid, AUCTION_TYPE_SECOND_PRICE};
    use crate::core::models::partner::Partner;
    use crate::core::openrtb::BidBuilder;
    use std::sync::Arc;

    fn request() -> AdRequest {
        AdRequest {
            publisher_id: Some("p1-publica".into()),
            site_id: Some("site-003".into()),
            deal_id: Some("PMP-2024-003".into()),
            content: Some(CtvContent {
                id: "content-9".into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn result() -> AuctionResult {
        AuctionResult {
            auction_type: AUCTION_TYPE_SECOND_PRICE,
            ranked: vec![RankedBid {
                partner: Arc::new(Partner {
                    name: "partner-a".into(),
                    ..Default::default()
                }),
                seat: Some("brand-seat".into()),
                bid: BidBuilder::default()
                    .id("b1")
                    .price(2.0)
                    .adm("https://cdn.example/spot.mp4")
                    .build()
                    .unwrap(),
            }],
            cleared_price: 1.8,
            publisher_revenue: 1.44,
        }
    }

    #[test]
    fn beacons_carry_the_attribution_params() {
        let body = render("https://ssp.example", &request(), &result(), "ev-1");

        let impression = &body.tracking_urls["impression"][0];
        assert!(impression.contains("pub=p1-publica"));
        assert!(impression.contains("site=site-003"));
        assert!(impression.contains("content=content-9"));
        assert!(impression.contains("deal=PMP-2024-003"));
    }

    #[test]
    fn break_duration_sums_ad_durations() {
        let body = render("https://ssp.example", &request(), &result(), "ev-1");

        assert_eq!(body.ads.len(), 1);
        assert_eq!(body.duration, body.ads.iter().map(|a| a.duration).sum::<u32>());
    }

    #[test]
    fn ad_carries_seat_as_advertiser_and_cleared_cpm() {
        let body = render("https://ssp.example", &request(), &result(), "ev-1");

        assert_eq!(body.ads[0].advertiser, "brand-seat");
        assert_eq!(body.ads[0].cpm, 1.8);
        assert_eq!(body.ads[0].media_url, "https://cdn.example/spot.mp4");
    }

    #[test]
    fn quartile_events_are_present() {
        let body = render("https://ssp.example", &request(), &result(), "ev-1");

        for event in ["start", "firstQuartile", "midpoint", "thirdQuartile", "complete"] {
            assert!(body.tracking_urls.contains_key(event), "missing {event}");
        }
    }
}
