//! Site adapter trait definitions
//!
//! A site adapter knows how to turn one `(channel, date)` pair into programs.
//! The grabber owns scheduling, timeouts and failure isolation; adapters only
//! fetch and parse.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::defaults::{DEFAULT_REQUEST_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::config::duration_serde;
use crate::errors::FetchResult;
use crate::models::{Channel, Program};

/// Per-request transport settings of a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_request_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    #[serde(default = "default_request_delay", with = "duration_serde::duration")]
    pub delay: Duration,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_request_timeout() -> Duration {
    Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)
}

fn default_request_delay() -> Duration {
    Duration::from_millis(DEFAULT_REQUEST_DELAY_MS)
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: default_request_timeout(),
            delay: default_request_delay(),
            headers: BTreeMap::new(),
        }
    }
}

/// Site configuration as loaded from `<site>.config.toml` or supplied by a
/// built-in adapter.
///
/// The grabber only reads `days` and `request.timeout`/`request.delay`; the
/// rest belongs to the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: String,
    /// Source URL template with `{site_id}`, `{date}` and `{lang}` placeholders
    pub url: Option<String>,
    pub days: Option<u32>,
    #[serde(default)]
    pub request: RequestConfig,
}

impl SiteConfig {
    pub fn new<S: Into<String>>(site: S) -> Self {
        Self {
            site: site.into(),
            url: None,
            days: None,
            request: RequestConfig::default(),
        }
    }

    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = timeout;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.request.delay = delay;
        self
    }

    /// Copy of this config with run-level request overrides applied
    pub fn with_overrides(&self, timeout: Option<Duration>, delay: Option<Duration>) -> Self {
        let mut config = self.clone();
        if let Some(timeout) = timeout {
            config.request.timeout = timeout;
        }
        if let Some(delay) = delay {
            config.request.delay = delay;
        }
        config
    }

    /// Longest a single task may take: the request delay plus its timeout
    pub fn deadline(&self) -> Duration {
        self.request.delay.saturating_add(self.request.timeout)
    }
}

/// Programs an adapter reported for one date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabBatch {
    pub date: NaiveDate,
    pub programs: Vec<Program>,
}

impl GrabBatch {
    pub fn new(date: NaiveDate, programs: Vec<Program>) -> Self {
        Self { date, programs }
    }
}

/// Per-task collector for progressive adapter results.
///
/// Each task gets its own sink; the grabber merges it only once the task
/// succeeded, so batches of a failed task never reach the guide.
#[derive(Debug, Default)]
pub struct BatchSink {
    batches: Vec<GrabBatch>,
}

impl BatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one batch of programs
    pub fn report(&mut self, batch: GrabBatch) {
        self.batches.push(batch);
    }

    pub fn batches(&self) -> &[GrabBatch] {
        &self.batches
    }

    pub fn program_count(&self) -> usize {
        self.batches.iter().map(|b| b.programs.len()).sum()
    }

    /// All reported programs, in report order
    pub fn into_programs(self) -> Vec<Program> {
        self.batches.into_iter().flat_map(|b| b.programs).collect()
    }
}

/// Fetch adapter for one site
#[async_trait]
pub trait FetchAdapter: Send + Sync {
    /// Site identifier this adapter is registered under
    fn site(&self) -> &str;

    /// Default configuration of the site
    fn config(&self) -> SiteConfig;

    /// Fetch programs of `channel` for `date` and report them into `sink`.
    ///
    /// `config` is the site config with run overrides already applied. An
    /// adapter may report any number of batches before returning.
    async fn grab(
        &self,
        channel: &Channel,
        date: NaiveDate,
        config: &SiteConfig,
        sink: &mut BatchSink,
    ) -> FetchResult<()>;
}
