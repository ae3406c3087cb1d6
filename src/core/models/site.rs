use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A publisher property carrying one or more placements
#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[serde(default)]
pub struct Site {
    pub id: String,
    pub publisher_id: String,
    pub name: String,
    pub domain: String,
    pub page_url: Option<String>,
    /// IAB content category tags, e.g. IAB1
    pub categories: Vec<String>,
    pub active: bool,
}
