//! Job scheduling type definitions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::errors::FetchError;
use crate::models::Channel;
use crate::sites::{FetchAdapter, SiteConfig};

/// Identity of one fetch task. Two tasks with equal keys are the same work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    pub site: String,
    pub lang: String,
    pub xmltv_id: String,
    pub date: NaiveDate,
}

impl TaskKey {
    pub fn new<S, L, X>(site: S, lang: L, xmltv_id: X, date: NaiveDate) -> Self
    where
        S: Into<String>,
        L: Into<String>,
        X: Into<String>,
    {
        Self {
            site: site.into(),
            lang: lang.into(),
            xmltv_id: xmltv_id.into(),
            date,
        }
    }

    /// Key of `channel` on `date`
    pub fn for_channel(channel: &Channel, date: NaiveDate) -> Self {
        Self::new(&channel.site, &channel.lang, &channel.xmltv_id, date)
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {} - {}",
            self.site,
            self.lang,
            self.xmltv_id,
            self.date.format("%b %-d, %Y")
        )
    }
}

/// Failure recorded on a task after its fetch failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TaskError {
    pub message: String,
    pub timed_out: bool,
}

impl From<&FetchError> for TaskError {
    fn from(err: &FetchError) -> Self {
        Self {
            message: err.to_string(),
            timed_out: matches!(err, FetchError::Timeout(_)),
        }
    }
}

/// One unit of work: grab `channel` for `date` with `adapter`
#[derive(Clone)]
pub struct FetchTask {
    pub channel: Channel,
    pub date: NaiveDate,
    pub config: SiteConfig,
    pub adapter: Arc<dyn FetchAdapter>,
    pub error: Option<TaskError>,
}

impl FetchTask {
    pub fn new(
        channel: Channel,
        date: NaiveDate,
        config: SiteConfig,
        adapter: Arc<dyn FetchAdapter>,
    ) -> Self {
        Self {
            channel,
            date,
            config,
            adapter,
            error: None,
        }
    }

    pub fn key(&self) -> TaskKey {
        TaskKey::for_channel(&self.channel, self.date)
    }
}

impl fmt::Debug for FetchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchTask")
            .field("channel", &self.channel)
            .field("date", &self.date)
            .field("config", &self.config)
            .field("adapter", &self.adapter.site())
            .field("error", &self.error)
            .finish()
    }
}
