use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A seller of inventory. Owned by the catalog, read-only here
#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[serde(default)]
pub struct Publisher {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub contact_email: Option<String>,
    pub active: bool,
    /// Fraction of the cleared price retained by the publisher,
    /// in [0.0, 1.0]. The complement is the exchange take
    pub rev_share: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
