use crate::core::catalog::provider::CatalogProvider;
use crate::core::catalog::Catalog;
use anyhow::{Context, Error};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Holds the current catalog snapshot behind a read-copy-update
/// swap. Readers on the hot path never block, the background
/// refresh publishes whole snapshots only
pub struct CatalogManager {
    snapshot: ArcSwap<Catalog>,
    provider: Box<dyn CatalogProvider>,
}

impl CatalogManager {
    /// Performs the initial load. Failure here is fatal for the
    /// process, an exchange without a catalog cannot serve
    pub async fn load(provider: Box<dyn CatalogProvider>) -> Result<CatalogManager, Error> {
        let doc = provider
            .fetch()
            .await
            .context("initial catalog load failed")?;

        let catalog = Catalog::from_document(doc);
        debug!(placements = catalog.len(), "catalog loaded");

        Ok(CatalogManager {
            snapshot: ArcSwap::from_pointee(catalog),
            provider,
        })
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.snapshot.load_full()
    }

    async fn refresh(&self) {
        match self.provider.fetch().await {
            Ok(doc) => {
                let catalog = Catalog::from_document(doc);
                debug!(placements = catalog.len(), "catalog refreshed");
                self.snapshot.store(Arc::new(catalog));
            }
            Err(e) => {
                // keep serving the previous snapshot on refresh failure
                warn!(error = %e, "catalog refresh failed");
            }
        }
    }

    /// Spawns the background refresh loop
    pub fn spawn_refresh(self: &Arc<Self>, interval: Duration) {
        let manager = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                manager.refresh().await;
            }
        });
    }
}
