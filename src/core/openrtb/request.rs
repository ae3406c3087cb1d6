use crate::core::openrtb::imp::Imp;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top level bid request (OpenRTB 2.5 §3.2.1)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct BidRequest {
    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imp: Vec<Imp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<Site>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<App>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Auction type, 1 = first price, 2 = second price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<i32>,

    /// Maximum milliseconds the caller tolerates for the auction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmax: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cur: Vec<String>,

    /// Blocked IAB content categories
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcat: Vec<String>,

    /// Blocked advertiser domains
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub badv: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regs: Option<Regs>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<Map<String, Value>>,
}

/// Website context of the inventory (§3.2.13)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Site {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// IAB content categories of the site
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cat: Vec<String>,

    /// Full URL of the page the impression shows on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    /// Referrer URL which caused navigation to the page
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
}

/// Application context for in-app inventory (§3.2.14)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct App {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cat: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
}

/// Seller of the inventory (§3.2.15)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Publisher {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Device the impression is delivered to (§3.2.18)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Device {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ua: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,

    /// General device type, 3 = connected tv
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devicetype: Option<i32>,

    /// Advertising identifier, e.g. the CTV device IFA
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifa: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Geo {
    /// ISO-3166-1 alpha-3 country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyeruid: Option<String>,
}

/// Upstream source of the request (§3.2.2). `ext.schain` carries
/// the supply chain attestation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Source {
    /// 1 = the exchange hosts the final auction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fd: Option<i32>,

    /// Transaction id common across all participants
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Regs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coppa: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<Map<String, Value>>,
}
