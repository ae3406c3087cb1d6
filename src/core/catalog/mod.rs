pub mod manager;
pub mod provider;

use crate::core::models::deal::Deal;
use crate::core::models::placement::{AdType, Placement};
use crate::core::models::publisher::Publisher;
use crate::core::models::site::Site;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// The catalog document shape served by the external store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDocument {
    pub publishers: Vec<Publisher>,
    pub sites: Vec<Site>,
    pub placements: Vec<Placement>,
    pub deals: Vec<Deal>,
}

/// An immutable catalog snapshot. Lookups on the hot path touch
/// nothing but these maps
#[derive(Default)]
pub struct Catalog {
    publishers: HashMap<String, Arc<Publisher>>,
    sites: HashMap<String, Arc<Site>>,
    placements: HashMap<String, Arc<Placement>>,
    deals: HashMap<String, Arc<Deal>>,
}

/// A placement resolved through its site up to the owning publisher
#[derive(Clone)]
pub struct ResolvedPlacement {
    pub placement: Arc<Placement>,
    pub site: Arc<Site>,
    pub publisher: Arc<Publisher>,
}

impl Catalog {
    pub fn from_document(doc: CatalogDocument) -> Catalog {
        let mut catalog = Catalog::default();

        for publisher in doc.publishers {
            catalog
                .publishers
                .insert(publisher.id.clone(), Arc::new(publisher));
        }

        for site in doc.sites {
            catalog.sites.insert(site.id.clone(), Arc::new(site));
        }

        for placement in doc.placements {
            if let Err(e) = placement.validate() {
                warn!(placement = %placement.id, error = %e, "skipping invalid placement");
                continue;
            }
            catalog
                .placements
                .insert(placement.id.clone(), Arc::new(placement));
        }

        for deal in doc.deals {
            catalog.deals.insert(deal.id.clone(), Arc::new(deal));
        }

        catalog
    }

    pub fn resolve(&self, placement_id: &str) -> Option<ResolvedPlacement> {
        let placement = self.placements.get(placement_id)?.clone();
        let site = self.sites.get(&placement.site_id)?.clone();
        let publisher = self.publishers.get(&site.publisher_id)?.clone();

        Some(ResolvedPlacement {
            placement,
            site,
            publisher,
        })
    }

    pub fn deal(&self, deal_id: &str) -> Option<Arc<Deal>> {
        self.deals.get(deal_id).cloned()
    }

    /// The video placement serving a site, used by SSAI callers who
    /// address inventory by site rather than placement. Deterministic
    /// by placement id when a site carries several
    pub fn video_placement_for_site(&self, site_id: &str) -> Option<ResolvedPlacement> {
        let mut candidates: Vec<&Arc<Placement>> = self
            .placements
            .values()
            .filter(|p| p.site_id == site_id && p.ad_type == AdType::Video)
            .collect();

        candidates.sort_by(|a, b| a.id.cmp(&b.id));

        let placement_id = candidates.first()?.id.clone();
        self.resolve(&placement_id)
    }

    /// Active publishers, the sellers.json population
    pub fn active_publishers(&self) -> Vec<Arc<Publisher>> {
        let mut publishers: Vec<Arc<Publisher>> = self
            .publishers
            .values()
            .filter(|p| p.active)
            .cloned()
            .collect();

        publishers.sort_by(|a, b| a.id.cmp(&b.id));
        publishers
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_placement_through_site_to_publisher() {
        let catalog = Catalog::from_document(testutil::sample_document());

        let resolved = catalog.resolve("plc-1").unwrap();
        assert_eq!(resolved.site.id, "site-1");
        assert_eq!(resolved.publisher.id, "pub-1");
    }

    #[test]
    fn unknown_placement_resolves_to_none() {
        let catalog = Catalog::from_document(testutil::sample_document());
        assert!(catalog.resolve("nope").is_none());
    }

    #[test]
    fn invalid_placements_are_dropped_at_load() {
        let mut doc = testutil::sample_document();
        doc.placements[0].width = 0;
        doc.placements[0].height = 0;

        let catalog = Catalog::from_document(doc);
        assert!(catalog.resolve("plc-1").is_none());
    }

    #[test]
    fn active_publishers_excludes_disabled() {
        let mut doc = testutil::sample_document();
        doc.publishers.push(Publisher {
            id: "pub-2".into(),
            active: false,
            ..Default::default()
        });

        let catalog = Catalog::from_document(doc);
        let active = catalog.active_publishers();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "pub-1");
    }
}
