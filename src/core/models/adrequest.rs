use crate::core::models::placement::Size;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Which wire protocol the request arrived on. Drives response
/// rendering only, the auction itself is ingress agnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Ingress {
    #[default]
    AdTag,
    Vast,
    OpenRtb,
    Ssai,
}

/// CTV content metadata forwarded by SSAI callers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CtvContent {
    pub id: String,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub language: Option<String>,
}

/// The canonical projection every ingress shape collapses onto.
/// Created per http request and discarded with the response
#[derive(Debug, Clone, Default)]
pub struct AdRequest {
    pub placement_id: String,
    /// SSAI callers address a site rather than a placement, the
    /// lookup stage resolves the site's video placement instead
    pub publisher_id: Option<String>,
    pub site_id: Option<String>,
    pub page_url: Option<String>,
    pub referer: Option<String>,
    pub ua: Option<String>,
    pub ip: Option<String>,
    pub w: Option<u32>,
    pub h: Option<u32>,
    /// Caller floor override, may only raise the placement floor
    pub floor: Option<f64>,
    pub deal_id: Option<String>,
    pub device_ifa: Option<String>,
    pub geo_country: Option<String>,
    pub content: Option<CtvContent>,
    pub ingress: Ingress,
}

impl AdRequest {
    pub fn size(&self) -> Option<Size> {
        match (self.w, self.h) {
            (Some(w), Some(h)) => Some(Size { w, h }),
            _ => None,
        }
    }

    /// Coarse device class used for deal targeting
    pub fn device_class(&self) -> &'static str {
        if self.content.is_some() || self.device_ifa.is_some() {
            "ctv"
        } else {
            "web"
        }
    }
}
