//! Sources for the bundled first-run portfolio document.

use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;
use std::time::Duration;

use folio_core::sync::{SeedDocument, SeedSourceTrait};
use folio_core::{Error, Result};

/// Default timeout for the seed download.
const DEFAULT_SEED_TIMEOUT_SECS: u64 = 10;

fn parse_seed(origin: &str, body: &str) -> Result<SeedDocument> {
    serde_json::from_str(body)
        .map_err(|e| Error::Seed(format!("{} is not a valid seed document: {}", origin, e)))
}

/// Seed document served over HTTP, e.g. `/data/portfolio-data.json`.
#[derive(Debug, Clone)]
pub struct HttpSeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSeedSource {
    pub fn new(url: &str) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_SEED_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl SeedSourceTrait for HttpSeedSource {
    async fn fetch(&self) -> Result<SeedDocument> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Seed(format!("{}: {}", self.url, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Seed(format!("{} returned {}", self.url, status)));
        }
        let body = response
            .text()
            .await
            .map_err(|e| Error::Seed(format!("{}: {}", self.url, e)))?;
        debug!("Fetched seed document from {} ({} bytes)", self.url, body.len());
        parse_seed(&self.url, &body)
    }
}

/// Seed document shipped as a file next to the application.
#[derive(Debug, Clone)]
pub struct FileSeedSource {
    path: PathBuf,
}

impl FileSeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeedSourceTrait for FileSeedSource {
    async fn fetch(&self) -> Result<SeedDocument> {
        let origin = self.path.display().to_string();
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Seed(format!("{}: {}", origin, e)))?;
        parse_seed(&origin, &body)
    }
}
