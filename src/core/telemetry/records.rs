use chrono::Utc;
use serde::Serialize;

/// One line in the append-only analytics log. The sink partitions
/// by the `date` field, dedup is its concern, not ours
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryRecord {
    Request(RequestRecord),
    Bid(BidRecord),
    Impression(ImpressionRecord),
    Click(ClickRecord),
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    pub ts: i64,
    pub date: String,
    pub auction_id: String,
    pub placement_id: String,
    pub publisher_id: String,
    pub ingress: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    /// Auction type of the cleared auction, absent on no-bids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BidRecord {
    pub ts: i64,
    pub date: String,
    pub auction_id: String,
    pub partner_id: String,
    /// bid / no_bid / error / timeout / skipped
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub elapsed_ms: u64,
    pub won: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpressionRecord {
    pub ts: i64,
    pub date: String,
    /// Exchange bid event id from the tracking url
    pub event_id: String,
    /// Which beacon fired, impression or a vast quartile
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_revenue: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClickRecord {
    pub ts: i64,
    pub date: String,
    pub event_id: String,
}

/// Millisecond timestamp plus the partition date, stamped together
/// so a record cannot straddle midnight
pub fn stamp() -> (i64, String) {
    let now = Utc::now();
    (now.timestamp_millis(), now.format("%Y-%m-%d").to_string())
}
