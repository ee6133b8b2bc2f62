//! XMLTV site adapter
//!
//! Drives any site that publishes per-channel XMLTV documents. The site is
//! described by its config file:
//!
//! ```toml
//! site = "example.com"
//! url = "https://example.com/epg/{site_id}/{date}.xml.gz"
//! days = 2
//!
//! [request]
//! timeout = "10s"
//! delay = "500ms"
//! headers = { "User-Agent" = "epg-grabber" }
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta};
use std::time::Duration;
use tracing::debug;

use super::traits::{BatchSink, FetchAdapter, GrabBatch, SiteConfig};
use crate::errors::{FetchError, FetchResult, SiteError};
use crate::models::{Channel, Program};
use crate::utils::DecompressionService;
use crate::utils::time::parse_xmltv_datetime;
use crate::utils::xmltv_parser::{SimpleXmltvProgram, parse_xmltv_programs};

const DEFAULT_PROGRAM_MINUTES: i64 = 30;

/// Adapter fetching an XMLTV document per channel and date
pub struct XmltvSiteAdapter {
    config: SiteConfig,
    url_template: String,
    client: reqwest::Client,
}

impl XmltvSiteAdapter {
    /// Create an adapter for `config`; the config must carry a URL template
    pub fn new(config: SiteConfig, client: reqwest::Client) -> Result<Self, SiteError> {
        let url_template = config.url.clone().ok_or_else(|| SiteError::InvalidConfig {
            site: config.site.clone(),
            message: "missing `url`".to_string(),
        })?;
        if config.site.is_empty() {
            return Err(SiteError::InvalidConfig {
                site: url_template,
                message: "missing `site`".to_string(),
            });
        }
        Ok(Self {
            config,
            url_template,
            client,
        })
    }

    /// Fill the URL template for one channel and date
    pub fn request_url(&self, channel: &Channel, date: NaiveDate) -> String {
        render_url(&self.url_template, channel, date)
    }
}

fn render_url(template: &str, channel: &Channel, date: NaiveDate) -> String {
    template
        .replace("{site_id}", &urlencoding::encode(&channel.site_id))
        .replace("{lang}", &urlencoding::encode(&channel.lang))
        .replace("{date}", &date.format("%Y-%m-%d").to_string())
}

fn to_program(channel: &Channel, program: SimpleXmltvProgram) -> FetchResult<Program> {
    let start = parse_xmltv_datetime(&program.start).map_err(|e| {
        FetchError::parse(format!("Failed to parse start time '{}': {e}", program.start))
    })?;
    let stop = match program.stop.as_deref() {
        Some(stop) => parse_xmltv_datetime(stop)
            .map_err(|e| FetchError::parse(format!("Failed to parse stop time '{stop}': {e}")))?,
        None => start + TimeDelta::minutes(DEFAULT_PROGRAM_MINUTES),
    };
    let title = program.title.unwrap_or_else(|| "Unknown Program".to_string());

    let mut result = Program::new(channel, start, stop, title);
    result.description = program.description;
    result.category = program.category;
    result.icon = program.icon;
    Ok(result)
}

/// reqwest reports its own deadline as a request error
fn request_error(error: reqwest::Error, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(timeout)
    } else {
        FetchError::Request(error)
    }
}

#[async_trait]
impl FetchAdapter for XmltvSiteAdapter {
    fn site(&self) -> &str {
        &self.config.site
    }

    fn config(&self) -> SiteConfig {
        self.config.clone()
    }

    async fn grab(
        &self,
        channel: &Channel,
        date: NaiveDate,
        config: &SiteConfig,
        sink: &mut BatchSink,
    ) -> FetchResult<()> {
        let url = self.request_url(channel, date);

        if !config.request.delay.is_zero() {
            tokio::time::sleep(config.request.delay).await;
        }

        debug!("Fetching XMLTV content from: {}", url);
        let mut request = self.client.get(&url).timeout(config.request.timeout);
        for (name, value) in &config.request.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let timeout = config.request.timeout;
        let response = request
            .send()
            .await
            .map_err(|e| request_error(e, timeout))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(e, timeout))?;
        debug!("Fetched {} bytes of raw XMLTV content", bytes.len());

        let decompressed = DecompressionService::decompress(&bytes)
            .map_err(|e| FetchError::parse(format!("Failed to decompress XMLTV content: {e}")))?;
        let content = String::from_utf8(decompressed)
            .map_err(|e| FetchError::parse(format!("Failed to decode XMLTV content as UTF-8: {e}")))?;

        let programs = parse_xmltv_programs(&content)?
            .into_iter()
            .filter(|program| program.channel == channel.site_id)
            .map(|program| to_program(channel, program))
            .collect::<FetchResult<Vec<_>>>()?;

        sink.report(GrabBatch::new(date, programs));
        Ok(())
    }
}
