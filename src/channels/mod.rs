//! Channel declaration loading
//!
//! A run grabs either every `*.channels.xml` file of one site directory
//! (`--site`) or one explicit file (`--channels`).

pub mod parser;

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::models::ChannelDeclaration;

pub use parser::parse_channels_xml;

const CHANNELS_FILE_SUFFIX: &str = ".channels.xml";

/// Where channel declarations come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSource {
    /// All `*.channels.xml` files under `<sites_dir>/<site>/`
    Site(String),
    /// One channels file
    Path(PathBuf),
}

impl ChannelSource {
    /// Pick the channel source from the CLI options. A site wins over a path;
    /// having neither is fatal.
    pub fn from_options(site: Option<String>, channels: Option<PathBuf>) -> AppResult<Self> {
        match (site, channels) {
            (Some(site), _) => Ok(Self::Site(site)),
            (None, Some(path)) => Ok(Self::Path(path)),
            (None, None) => Err(AppError::MissingChannelSource),
        }
    }

    /// Resolve the channels files this source refers to, sorted by name
    pub fn files(&self, sites_dir: &Path) -> AppResult<Vec<PathBuf>> {
        match self {
            Self::Path(path) => Ok(vec![path.clone()]),
            Self::Site(site) => {
                let dir = sites_dir.join(site);
                let entries = std::fs::read_dir(&dir).map_err(|e| AppError::io(&dir, e))?;
                let mut files: Vec<PathBuf> = entries
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|path| {
                        path.file_name()
                            .and_then(|name| name.to_str())
                            .is_some_and(|name| name.ends_with(CHANNELS_FILE_SUFFIX))
                    })
                    .collect();
                files.sort();
                Ok(files)
            }
        }
    }
}

/// Read and parse every channels file of `source`, in file order
pub async fn load_declarations(
    source: &ChannelSource,
    sites_dir: &Path,
) -> AppResult<Vec<ChannelDeclaration>> {
    let files = source.files(sites_dir)?;
    let mut declarations = Vec::new();

    for path in &files {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::io(path, e))?;
        let parsed = parse_channels_xml(&content, &path.display().to_string())?;
        debug!("Parsed {} channel(s) from {}", parsed.len(), path.display());
        declarations.extend(parsed);
    }

    info!(
        "Found {} channel(s) in {} file(s)",
        declarations.len(),
        files.len()
    );
    Ok(declarations)
}
