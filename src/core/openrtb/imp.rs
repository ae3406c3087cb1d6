use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// An impression being offered for auction (OpenRTB 2.5 §3.2.4).
/// Exactly one of `banner`, `video`, `audio` or `native` is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Imp {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<Native>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmp: Option<Pmp>,

    /// Placement identifier as configured in the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagid: Option<String>,

    /// Minimum acceptable bid in CPM
    #[serde(default, skip_serializing_if = "is_zero")]
    pub bidfloor: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidfloorcur: Option<String>,

    /// 1 = creative must be served over https
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure: Option<i32>,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Banner {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<Format>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Format {
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Video {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mimes: Vec<String>,

    /// Minimum ad duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minduration: Option<u32>,

    /// Maximum ad duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxduration: Option<u32>,

    /// Supported VAST protocol codes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub startdelay: Option<i32>,

    /// 1 = linear/in-stream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linearity: Option<i32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub playbackmethod: Vec<i32>,

    /// Supported API framework codes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Audio {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mimes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minduration: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxduration: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Native {
    /// Opaque native markup request per the Native Ads spec
    pub request: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
}

/// Private marketplace container (§3.2.11)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Pmp {
    /// 1 = only bids referencing one of the deals are accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_auction: Option<i32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deals: Vec<Deal>,
}

/// A specific deal struck between the seller and a buyer (§3.2.12)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Deal {
    pub id: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub bidfloor: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidfloorcur: Option<String>,

    /// Auction type override for this deal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<i32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wseat: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wadomain: Vec<String>,
}
