use chrono::{DateTime, NaiveDate, Utc};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use defaults::*;

/// Top-level configuration, layered from defaults, a TOML file and the
/// environment. CLI flags are applied on top by the binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grab: GrabConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Per-run grab settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrabConfig {
    /// Restrict to one language code
    pub lang: Option<String>,
    /// Override the number of days every site is grabbed for
    pub days: Option<u32>,
    /// Number of tasks in flight at once
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Override the per-request timeout of every site
    #[serde(default, with = "duration_serde::option_duration")]
    pub timeout: Option<Duration>,
    /// Override the per-request delay of every site
    #[serde(default, with = "duration_serde::option_duration")]
    pub delay: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `<site>/<site>.config.toml` and `*.channels.xml`
    #[serde(default = "default_sites_dir")]
    pub sites_dir: PathBuf,
    /// Guide output path
    #[serde(default = "default_output_path")]
    pub output: PathBuf,
    /// Channel catalog (`channels.json`), local path or http(s) URL
    pub catalog: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Also write a gzip-compressed copy of the guide
    #[serde(default)]
    pub gzip: bool,
    /// Also write the grabbed channels as `<output stem>.channels.xml`
    #[serde(default)]
    pub channels_listing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Cron expression; when set the grabber keeps running on schedule
    pub cron: Option<String>,
}

fn default_max_connections() -> usize {
    DEFAULT_MAX_CONNECTIONS
}

fn default_sites_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SITES_DIR)
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            lang: None,
            days: None,
            max_connections: default_max_connections(),
            timeout: None,
            delay: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sites_dir: default_sites_dir(),
            output: default_output_path(),
            catalog: None,
        }
    }
}

impl Config {
    /// Load configuration from `config_file` (optional) and `EPG_GRABBER_*`
    /// environment variables. Nested keys use `__`, e.g.
    /// `EPG_GRABBER_GRAB__MAX_CONNECTIONS=4`.
    pub fn load(config_file: &Path) -> AppResult<Self> {
        debug!("Loading configuration from {}", config_file.display());
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }
}

/// Immutable per-run options passed through every component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub lang: Option<String>,
    pub days: Option<u32>,
    pub max_connections: usize,
    pub timeout: Option<Duration>,
    pub delay: Option<Duration>,
    /// Overrides "today" for deterministic runs
    pub reference_date: Option<NaiveDate>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            lang: None,
            days: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            timeout: None,
            delay: None,
            reference_date: None,
        }
    }
}

impl RunOptions {
    /// Build run options from the `[grab]` section
    pub fn from_config(grab: &GrabConfig) -> Self {
        Self {
            lang: grab.lang.clone(),
            days: grab.days,
            max_connections: grab.max_connections,
            timeout: grab.timeout,
            delay: grab.delay,
            reference_date: None,
        }
    }

    pub fn with_lang<S: Into<String>>(mut self, lang: S) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Reject options the engine cannot honour
    pub fn validate(&self) -> AppResult<()> {
        if self.max_connections == 0 {
            return Err(AppError::configuration(
                "max_connections must be at least 1",
            ));
        }
        if self.days == Some(0) {
            return Err(AppError::configuration("days must be at least 1"));
        }
        Ok(())
    }

    /// The first date to grab
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Parse a reference date given as `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_reference_date(value: &str) -> AppResult<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|e| AppError::configuration(format!("Invalid reference date '{value}': {e}")))
}
