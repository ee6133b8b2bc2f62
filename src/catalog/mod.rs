//! Channel catalog
//!
//! Cross-reference database of known channels (an iptv-org style
//! `channels.json`). When a declared `xmltv_id` is found here, the catalog's
//! name and logo replace the declared ones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};

/// One catalog record. Unknown fields in the source document are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Lookup by cross-reference id
pub trait ChannelCatalog: Send + Sync {
    fn lookup(&self, xmltv_id: &str) -> Option<CatalogEntry>;
}

/// In-memory catalog loaded from JSON
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl JsonCatalog {
    /// Catalog with no entries; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from entries; the first entry of a repeated id wins
    pub fn from_entries<I: IntoIterator<Item = CatalogEntry>>(entries: I) -> Self {
        let mut map = HashMap::new();
        for entry in entries {
            map.entry(entry.id.clone()).or_insert(entry);
        }
        Self { entries: map }
    }

    /// Parse a JSON array of entries
    pub fn from_json(content: &str) -> AppResult<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(content)
            .map_err(|e| AppError::catalog(format!("Invalid channels.json: {e}")))?;
        Ok(Self::from_entries(entries))
    }

    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::io(path, e))?;
        Self::from_json(&content)
    }

    pub async fn fetch(url: &str, client: &reqwest::Client) -> AppResult<Self> {
        debug!("Fetching channel catalog from: {}", url);
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::catalog(format!(
                "Failed to fetch {url}: HTTP {status}"
            )));
        }
        let content = response.text().await?;
        Self::from_json(&content)
    }

    /// Load from a local path or an http(s) URL
    pub async fn load(location: &str, client: &reqwest::Client) -> AppResult<Self> {
        let catalog = if location.starts_with("http://") || location.starts_with("https://") {
            Self::fetch(location, client).await?
        } else {
            Self::from_path(Path::new(location)).await?
        };
        info!("Loaded {} catalog channel(s) from {}", catalog.len(), location);
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ChannelCatalog for JsonCatalog {
    fn lookup(&self, xmltv_id: &str) -> Option<CatalogEntry> {
        self.entries.get(xmltv_id).cloned()
    }
}
