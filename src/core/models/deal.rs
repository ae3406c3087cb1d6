use crate::core::models::placement::Size;
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DealStatus {
    #[default]
    Active,
    Paused,
    Ended,
}

/// A private marketplace agreement. The id doubles as the wire-level
/// `dealid` bids must echo back
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct Deal {
    pub id: String,
    /// Agreed fixed price in CPM
    pub cpm: f64,
    pub currency: String,
    /// Advisory cap, paced by the catalog owner
    pub impression_cap: Option<u64>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Eligible sizes, all when empty
    pub sizes: Vec<Size>,
    /// Eligible device classes (web, mobile, ctv), all when empty
    pub devices: Vec<String>,
    /// Eligible country codes, all when empty
    pub geos: Vec<String>,
    pub status: DealStatus,
}

impl Default for Deal {
    fn default() -> Self {
        Deal {
            id: String::new(),
            cpm: 0.0,
            currency: "USD".to_string(),
            impression_cap: None,
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
            sizes: Vec::new(),
            devices: Vec::new(),
            geos: Vec::new(),
            status: DealStatus::Active,
        }
    }
}

impl Deal {
    /// Status after applying the validity window: a future start is
    /// treated as paused, a past end as ended
    pub fn effective_status(&self, now: DateTime<Utc>) -> DealStatus {
        if self.status == DealStatus::Ended || now >= self.end {
            return DealStatus::Ended;
        }

        if self.status == DealStatus::Paused || now < self.start {
            return DealStatus::Paused;
        }

        DealStatus::Active
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == DealStatus::Active
    }

    /// A request matches when every *present* targeting axis matches.
    /// Absent axes on the deal accept anything
    pub fn matches(
        &self,
        size: Option<Size>,
        device: Option<&str>,
        geo: Option<&str>,
    ) -> bool {
        if !self.sizes.is_empty() {
            match size {
                Some(size) if self.sizes.contains(&size) => {}
                _ => return false,
            }
        }

        if !self.devices.is_empty() {
            match device {
                Some(device) if self.devices.iter().any(|d| d == device) => {}
                _ => return false,
            }
        }

        if !self.geos.is_empty() {
            match geo {
                Some(geo) if self.geos.iter().any(|g| g.eq_ignore_ascii_case(geo)) => {}
                _ => return false,
            }
        }

        true
    }
}
