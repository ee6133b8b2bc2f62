//! Site registry
//!
//! Lookup table from site identifier to adapter, built once at startup from
//! the built-in adapters and the `<sites_dir>/<site>/<site>.config.toml`
//! files.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::dummy::DummyAdapter;
use super::traits::{FetchAdapter, SiteConfig};
use super::xmltv::XmltvSiteAdapter;
use crate::errors::{AppError, AppResult, SiteError};

const CONFIG_FILE_SUFFIX: &str = ".config.toml";

#[derive(Clone, Default)]
pub struct SiteRegistry {
    adapters: HashMap<String, Arc<dyn FetchAdapter>>,
}

impl SiteRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in adapters
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DummyAdapter::new()));
        registry
    }

    /// Register an adapter under its site identifier, returning the adapter
    /// it replaced
    pub fn register(&mut self, adapter: Arc<dyn FetchAdapter>) -> Option<Arc<dyn FetchAdapter>> {
        let site = adapter.site().to_string();
        let previous = self.adapters.insert(site.clone(), adapter);
        if previous.is_some() {
            debug!("Replaced adapter for site '{}'", site);
        }
        previous
    }

    /// Look up the adapter of `site`
    pub fn resolve(&self, site: &str) -> Result<Arc<dyn FetchAdapter>, SiteError> {
        self.adapters
            .get(site)
            .cloned()
            .ok_or_else(|| SiteError::UnknownSite {
                site: site.to_string(),
            })
    }

    /// Registered site identifiers, sorted
    pub fn sites(&self) -> Vec<&str> {
        let mut sites: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        sites.sort_unstable();
        sites
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Register an [`XmltvSiteAdapter`] for every `<site>/<site>.config.toml`
    /// under `sites_dir`.
    ///
    /// A missing directory registers nothing. An invalid config is logged and
    /// skipped so the other sites stay usable. Returns the number of adapters
    /// registered.
    pub fn load_dir(&mut self, sites_dir: &Path, client: &reqwest::Client) -> AppResult<usize> {
        if !sites_dir.is_dir() {
            debug!("Sites directory {} not found, using built-in sites only", sites_dir.display());
            return Ok(0);
        }

        let entries = std::fs::read_dir(sites_dir).map_err(|e| AppError::io(sites_dir, e))?;
        let mut site_dirs: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect();
        site_dirs.sort();

        let mut loaded = 0;
        for dir in site_dirs {
            let Some(site) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            let config_path = dir.join(format!("{site}{CONFIG_FILE_SUFFIX}"));
            if !config_path.is_file() {
                continue;
            }

            match load_site_config(&site, &config_path)
                .and_then(|config| XmltvSiteAdapter::new(config, client.clone()))
            {
                Ok(adapter) => {
                    self.register(Arc::new(adapter));
                    loaded += 1;
                }
                Err(e) => warn!("Skipping site config {}: {}", config_path.display(), e),
            }
        }

        info!("Loaded {} site config(s) from {}", loaded, sites_dir.display());
        Ok(loaded)
    }
}

fn load_site_config(site: &str, path: &Path) -> Result<SiteConfig, SiteError> {
    let invalid = |message: String| SiteError::InvalidConfig {
        site: site.to_string(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let mut config: SiteConfig = toml::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    if config.site.is_empty() {
        config.site = site.to_string();
    }
    Ok(config)
}

impl fmt::Debug for SiteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteRegistry")
            .field("sites", &self.sites())
            .finish()
    }
}
