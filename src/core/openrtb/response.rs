use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Bid response returned by a demand partner (OpenRTB 2.5 §4.2.1)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct BidResponse {
    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seatbid: Vec<SeatBid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cur: Option<String>,

    /// No-bid reason code, see [`crate::core::spec::nobidreasons`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbr: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct SeatBid {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bid: Vec<Bid>,

    /// Buyer seat (typically the advertiser or agency) the bids belong to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
}

/// A single bid for an impression (§4.2.3)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Bid {
    pub id: String,

    /// The `imp.id` this bid applies to
    #[serde(default)]
    pub impid: String,

    /// Bid price in CPM
    #[serde(default)]
    pub price: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub adid: Option<String>,

    /// Win notice URL, may carry the `${AUCTION_PRICE}` macro
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurl: Option<String>,

    /// Billing notice URL fired when the impression is counted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burl: Option<String>,

    /// Ad markup, or a media URL for SSAI demand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adm: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adomain: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,

    /// Advisory seconds the bid may be cached before the impression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u32>,
}
