//! Writes a rendered guide to disk

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::Guide;
use crate::config::OutputConfig;
use crate::errors::{AppError, AppResult};

/// Files produced by one write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenGuide {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct GuideWriter {
    output: PathBuf,
    gzip: bool,
    channels_listing: bool,
}

impl GuideWriter {
    pub fn new<P: Into<PathBuf>>(output: P) -> Self {
        Self {
            output: output.into(),
            gzip: false,
            channels_listing: false,
        }
    }

    pub fn from_config<P: Into<PathBuf>>(output: P, config: &OutputConfig) -> Self {
        Self::new(output)
            .with_gzip(config.gzip)
            .with_channels_listing(config.channels_listing)
    }

    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    pub fn with_channels_listing(mut self, channels_listing: bool) -> Self {
        self.channels_listing = channels_listing;
        self
    }

    /// `guide.xml` -> `guide.xml.gz`
    pub fn gzip_path(&self) -> PathBuf {
        let mut name = self.output.clone().into_os_string();
        name.push(".gz");
        PathBuf::from(name)
    }

    /// `guide.xml` -> `guide.channels.xml`
    pub fn channels_path(&self) -> PathBuf {
        self.output.with_extension("channels.xml")
    }

    /// Write the guide and, when enabled, its gzip copy and channel listing
    pub async fn write(&self, guide: &Guide) -> AppResult<WrittenGuide> {
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::io(parent, e))?;
        }

        let xmltv = guide.to_xmltv();
        let mut written = WrittenGuide::default();

        write_file(&self.output, xmltv.as_bytes()).await?;
        written.paths.push(self.output.clone());

        if self.gzip {
            let path = self.gzip_path();
            let compressed = compress(xmltv.as_bytes()).map_err(|e| AppError::io(&path, e))?;
            write_file(&path, &compressed).await?;
            written.paths.push(path);
        }

        if self.channels_listing {
            let path = self.channels_path();
            write_file(&path, guide.to_channels_xml().as_bytes()).await?;
            written.paths.push(path);
        }

        Ok(written)
    }
}

async fn write_file(path: &Path, content: &[u8]) -> AppResult<()> {
    info!("Saving to \"{}\"...", path.display());
    tokio::fs::write(path, content)
        .await
        .map_err(|e| AppError::io(path, e))
}

fn compress(content: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    encoder.finish()
}
