use crate::core::catalog::manager::CatalogManager;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const SELLERS_VERSION: &str = "1.0";

/// IAB sellers.json v1.0 document projected from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SellersJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,

    pub version: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sellers: Vec<Seller>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Seller {
    pub seller_id: String,

    /// 1 when the seller identity is withheld
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_confidential: Option<i32>,

    pub seller_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Projects the active publishers into a sellers.json document.
/// Inactive publishers are omitted entirely, publishers without a
/// domain are listed confidentially
pub fn project(catalog: &crate::core::catalog::Catalog, contact_email: Option<String>) -> SellersJson {
    let sellers = catalog
        .active_publishers()
        .into_iter()
        .map(|publisher| {
            let confidential = publisher.domain.is_empty();

            Seller {
                seller_id: publisher.id.clone(),
                is_confidential: confidential.then_some(1),
                seller_type: "PUBLISHER".to_string(),
                name: (!confidential).then(|| publisher.name.clone()),
                domain: (!publisher.domain.is_empty()).then(|| publisher.domain.clone()),
            }
        })
        .collect();

    SellersJson {
        contact_email,
        version: SELLERS_VERSION.to_string(),
        sellers,
    }
}

/// Serves the serialized document out of a TTL cache so publisher
/// table changes show up within the configured window without
/// re-projecting on every request
pub struct SellersCache {
    catalog: Arc<CatalogManager>,
    contact_email: Option<String>,
    cache: Cache<(), String>,
}

impl SellersCache {
    pub fn new(
        catalog: Arc<CatalogManager>,
        contact_email: Option<String>,
        ttl: Duration,
    ) -> Self {
        SellersCache {
            catalog,
            contact_email,
            cache: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
        }
    }

    pub fn document(&self) -> String {
        if let Some(cached) = self.cache.get(&()) {
            return cached;
        }

        let document = project(&self.catalog.catalog(), self.contact_email.clone());
        let serialized = serde_json::to_string(&document)
            .unwrap_or_else(|_| format!("{{\"version\":\"{SELLERS_VERSION}\"}}"));

        self.cache.insert((), serialized.clone());
        serialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{Catalog, CatalogDocument};
    use crate::core::models::publisher::Publisher;

    fn catalog_with(publishers: Vec<Publisher>) -> Catalog {
        Catalog::from_document(CatalogDocument {
            publishers,
            ..Default::default()
        })
    }

    #[test]
    fn inactive_publishers_are_omitted() {
        let catalog = catalog_with(vec![
            Publisher {
                id: "pub-1".into(),
                name: "One".into(),
                domain: "one.example".into(),
                active: true,
                ..Default::default()
            },
            Publisher {
                id: "pub-2".into(),
                active: false,
                ..Default::default()
            },
        ]);

        let doc = project(&catalog, None);

        assert_eq!(doc.sellers.len(), 1);
        assert_eq!(doc.sellers[0].seller_id, "pub-1");
        assert_eq!(doc.sellers[0].seller_type, "PUBLISHER");
    }

    #[test]
    fn empty_domain_is_confidential() {
        let catalog = catalog_with(vec![Publisher {
            id: "pub-1".into(),
            name: "Secret".into(),
            domain: String::new(),
            active: true,
            ..Default::default()
        }]);

        let doc = project(&catalog, None);
        let seller = &doc.sellers[0];

        assert_eq!(seller.is_confidential, Some(1));
        assert!(seller.name.is_none());
        assert!(seller.domain.is_none());

        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains(r#""is_confidential":1"#));
    }

    #[test]
    fn version_is_one_zero() {
        let doc = project(&catalog_with(vec![]), Some("ops@ssp.example".into()));
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.contact_email.as_deref(), Some("ops@ssp.example"));
    }
}
