use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};

/// Wire dialect a demand partner speaks. The transport capabilities
/// for each flavor live in [`crate::core::demand::flavor`]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumString, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Flavor {
    #[default]
    Openrtb,
    Whitelabel,
    LegacyAdx,
}

/// A configured demand partner
#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[serde(default)]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub flavor: Flavor,
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Per-request deadline in milliseconds, bounded above by the
    /// auction tmax residual at dispatch time
    pub timeout_ms: u64,
    /// QPS ceiling, 0 = unlimited
    pub qps: u32,
    /// Exchange-side revenue share deducted from whitelabel bids
    pub ssp_share: f64,
    pub active: bool,
}

impl Partner {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn flavor_parses_kebab_case() {
        assert_eq!(Flavor::from_str("openrtb").unwrap(), Flavor::Openrtb);
        assert_eq!(Flavor::from_str("whitelabel").unwrap(), Flavor::Whitelabel);
        assert_eq!(Flavor::from_str("legacy-adx").unwrap(), Flavor::LegacyAdx);
        assert_eq!(Flavor::from_str("LEGACY-ADX").unwrap(), Flavor::LegacyAdx);
        assert!(Flavor::from_str("smtp").is_err());
    }
}
