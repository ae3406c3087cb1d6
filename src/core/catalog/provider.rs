use crate::core::catalog::CatalogDocument;
use anyhow::{anyhow, Context, Error};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Narrow interface over the external catalog store. The core only
/// ever pulls full snapshots, writes belong to the admin surface
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn fetch(&self) -> Result<CatalogDocument, Error>;
}

/// Pulls the catalog from an http endpoint returning the document
/// as json
pub struct HttpCatalogProvider {
    url: String,
    client: reqwest::Client,
}

impl HttpCatalogProvider {
    pub fn new(url: String) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent("sellside")
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(HttpCatalogProvider { url, client })
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalogProvider {
    async fn fetch(&self) -> Result<CatalogDocument, Error> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("catalog fetch from {} failed", self.url))?;

        if !res.status().is_success() {
            return Err(anyhow!("catalog store returned http {}", res.status()));
        }

        Ok(res.json::<CatalogDocument>().await?)
    }
}

/// Reads the catalog document from a local json file, the local-dev
/// and test provider
pub struct FileCatalogProvider {
    path: PathBuf,
}

impl FileCatalogProvider {
    pub fn new(path: PathBuf) -> Self {
        FileCatalogProvider { path }
    }
}

#[async_trait]
impl CatalogProvider for FileCatalogProvider {
    async fn fetch(&self) -> Result<CatalogDocument, Error> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed reading catalog file {}", self.path.display()))?;

        Ok(serde_json::from_str(&raw)?)
    }
}

/// Picks a provider from the configured connection string
pub fn provider_for(database_url: &str) -> Result<Box<dyn CatalogProvider>, Error> {
    if database_url.is_empty() {
        return Err(anyhow!("DATABASE_URL must be set"));
    }

    if database_url.starts_with("http://") || database_url.starts_with("https://") {
        return Ok(Box::new(HttpCatalogProvider::new(database_url.to_string())?));
    }

    let path = database_url.strip_prefix("file:").unwrap_or(database_url);

    Ok(Box::new(FileCatalogProvider::new(PathBuf::from(path))))
}
