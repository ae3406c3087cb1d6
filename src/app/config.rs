use crate::core::models::partner::{Flavor, Partner};
use crate::core::observability::provider::LoggingConfig;
use anyhow::{bail, Error};
use config::{Config, Environment};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use url::Url;

const DEFAULT_PARTNER_TIMEOUT_MS: u64 = 100;

/// Process configuration, read once from the environment at startup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SspConfig {
    /// Identifier emitted in our supply chain node
    pub ssp_id: String,
    /// Public origin used in generated tracking urls
    pub ssp_endpoint: String,
    pub port: u16,
    /// Catalog connection string, http(s) snapshot url or a file path
    pub database_url: String,
    pub analytics_url: Option<String>,
    #[serde(deserialize_with = "de_truthy")]
    pub analytics_enabled: bool,
    /// Global minimum floor applied under the placement floor
    pub auction_floor: f64,
    /// Default auction deadline in milliseconds
    pub tmax_ms: u64,
    pub contact_email: Option<String>,
    /// Forwarded-for header chain trusted for client ip extraction
    pub forwarded_headers: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub catalog_refresh: Duration,
    #[serde(with = "humantime_serde")]
    pub sellers_ttl: Duration,
    /// How long a cleared win waits for its impression pixel
    #[serde(with = "humantime_serde")]
    pub notice_ttl: Duration,
    pub logging: LoggingConfig,
    /// Demand partners, scanned from `<NAME>_ENDPOINT` style vars
    #[serde(skip)]
    pub partners: Vec<Partner>,
}

impl Default for SspConfig {
    fn default() -> Self {
        Self {
            ssp_id: "sellside".to_string(),
            ssp_endpoint: "http://localhost:8080".to_string(),
            port: 8080,
            database_url: String::new(),
            analytics_url: None,
            analytics_enabled: false,
            auction_floor: 0.01,
            tmax_ms: 120,
            contact_email: None,
            forwarded_headers: vec!["x-forwarded-for".to_string(), "x-real-ip".to_string()],
            catalog_refresh: Duration::from_secs(30),
            sellers_ttl: Duration::from_secs(300),
            notice_ttl: Duration::from_secs(600),
            logging: LoggingConfig::default(),
            partners: Vec::new(),
        }
    }
}

impl SspConfig {
    pub fn load() -> Result<SspConfig, Error> {
        let cfg = Config::builder()
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("forwarded_headers"),
            )
            .build()?;

        let mut config: SspConfig = cfg.try_deserialize()?;
        config.partners = partners_from_env(std::env::vars());
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.auction_floor < 0.0 {
            bail!("AUCTION_FLOOR must be non-negative");
        }

        if self.tmax_ms == 0 {
            bail!("tmax must be positive");
        }

        self.logging.validate()?;

        Url::parse(&self.ssp_endpoint)
            .map_err(|e| anyhow::anyhow!("SSP_ENDPOINT is not a url: {e}"))?;

        for partner in &self.partners {
            if !(0.0..=1.0).contains(&partner.ssp_share) {
                bail!(
                    "partner {} rev share {} outside [0, 1]",
                    partner.id,
                    partner.ssp_share
                );
            }

            Url::parse(&partner.endpoint)
                .map_err(|e| anyhow::anyhow!("partner {} endpoint is not a url: {e}", partner.id))?;
        }

        Ok(())
    }

    pub fn tmax(&self) -> Duration {
        Duration::from_millis(self.tmax_ms)
    }
}

/// Truthiness for flag style env vars: 1/true/yes/on enable
pub fn truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn de_truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    struct TruthyVisitor;

    impl Visitor<'_> for TruthyVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a boolean or truthy string")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            Ok(truthy(v))
        }
    }

    deserializer.deserialize_any(TruthyVisitor)
}

/// Scans the environment for partner registrations of the form
/// `<NAME>_ENDPOINT`, `<NAME>_API_KEY`, `<NAME>_REV_SHARE`,
/// `<NAME>_ENABLED`, plus `<NAME>_FLAVOR`, `<NAME>_TIMEOUT_MS` and
/// `<NAME>_QPS`
pub fn partners_from_env<I>(vars: I) -> Vec<Partner>
where
    I: Iterator<Item = (String, String)>,
{
    let vars: HashMap<String, String> = vars.collect();
    let mut partners = Vec::new();

    let mut names: Vec<&str> = vars
        .keys()
        .filter_map(|key| key.strip_suffix("_ENDPOINT"))
        // SSP_ENDPOINT is our own public origin, not a partner
        .filter(|name| !name.is_empty() && *name != "SSP")
        .collect();
    names.sort_unstable();

    for name in names {
        let get = |suffix: &str| vars.get(&format!("{name}_{suffix}")).cloned();

        let endpoint = match get("ENDPOINT") {
            Some(endpoint) if !endpoint.is_empty() => endpoint,
            _ => continue,
        };

        let active = get("ENABLED").map(|v| truthy(&v)).unwrap_or(true);

        let flavor = match get("FLAVOR") {
            Some(raw) => match Flavor::from_str(&raw) {
                Ok(flavor) => flavor,
                Err(_) => {
                    warn!(partner = name, flavor = %raw, "unknown flavor, using openrtb");
                    Flavor::Openrtb
                }
            },
            None => Flavor::Openrtb,
        };

        let ssp_share = get("REV_SHARE")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);

        let timeout_ms = get("TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_PARTNER_TIMEOUT_MS);

        let qps = get("QPS").and_then(|v| v.parse::<u32>().ok()).unwrap_or(0);

        partners.push(Partner {
            id: name.to_ascii_lowercase(),
            name: name.to_ascii_lowercase(),
            flavor,
            endpoint,
            api_key: get("API_KEY").filter(|k| !k.is_empty()),
            timeout_ms,
            qps,
            ssp_share,
            active,
        });
    }

    partners
}
