use moka::sync::Cache;
use std::time::Duration;
use tracing::debug;

/// Canonical price macro partners embed in notice urls
pub const AUCTION_PRICE_MACRO: &str = "${AUCTION_PRICE}";

/// A cleared win waiting for its impression pixel. Cached under the
/// exchange-assigned bid event id so the tracking endpoints can
/// settle it later
#[derive(Clone, Debug, Default)]
pub struct PendingNotice {
    pub auction_id: String,
    pub partner_id: String,
    pub publisher_id: String,
    pub placement_id: String,
    pub deal_id: Option<String>,
    /// Billing notice url, fired when the pixel is served
    pub burl: Option<String>,
    pub cleared_price: f64,
    pub publisher_revenue: f64,
}

/// TTL cache of pending notices keyed by bid event id. Entries are
/// consumed on first read, later pixels for the same id still count
/// impressions but cannot re-fire the burl
pub struct NoticeCache {
    cache: Cache<String, PendingNotice>,
}

impl NoticeCache {
    pub fn new(event_ttl: Duration) -> Self {
        NoticeCache {
            cache: Cache::builder().time_to_live(event_ttl).build(),
        }
    }

    pub fn insert(&self, event_id: &str, notice: PendingNotice) {
        self.cache.insert(event_id.to_string(), notice);
    }

    /// Get and remove the entry for this event id
    pub fn take(&self, event_id: &str) -> Option<PendingNotice> {
        self.cache.remove(event_id)
    }
}

/// Substitute the auction price macro wherever it appears
pub fn expand_price_macro(url: &str, price: f64) -> String {
    url.replace(AUCTION_PRICE_MACRO, &format!("{price}"))
}

/// Fires win/billing notices to partners. Outcomes are logged only,
/// a failed notice never affects the caller
pub struct Notifier {
    client: reqwest::Client,
}

impl Notifier {
    pub fn new() -> Result<Self, anyhow::Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent("sellside")
            .timeout(Duration::from_secs(2))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Notifier { client })
    }

    /// Fire-and-forget GET with the cleared price substituted in.
    /// Detached from the auction task so a slow partner cannot hold
    /// the response open
    pub fn fire(&self, url: &str, price: f64) {
        let url = expand_price_macro(url, price);
        let client = self.client.clone();

        tokio::spawn(async move {
            match client.get(&url).send().await {
                Ok(res) => debug!(url = %url, status = %res.status(), "notice fired"),
                Err(e) => debug!(url = %url, error = %e, "notice failed"),
            }
        });
    }
}
