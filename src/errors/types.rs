//! Error type definitions for the grabber

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type for a grab run
#[derive(Error, Debug)]
pub enum AppError {
    /// Neither a site nor a channels file was given
    #[error("One of the arguments must be presented: `--site` or `--channels`")]
    MissingChannelSource,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Layered configuration could not be extracted
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// Filesystem errors with the offending path
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML in a channels file
    #[error("XML parse error in {path}: {message}")]
    Xml { path: String, message: String },

    /// Channel catalog could not be loaded
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// Site registry problems found while loading site configs
    #[error("Site error: {0}")]
    Site(#[from] SiteError),

    /// HTTP client errors outside of a single task
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Site registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SiteError {
    /// No adapter registered for the site
    #[error("Site '{site}' is not registered")]
    UnknownSite { site: String },

    /// A site config file is invalid
    #[error("Invalid config for site '{site}': {message}")]
    InvalidConfig { site: String, message: String },
}

/// Errors raised by an adapter for a single (channel, date) task
#[derive(Error, Debug)]
pub enum FetchError {
    /// The task ran past its request delay plus timeout
    #[error("Request timed out after {}", human_duration(.0))]
    Timeout(Duration),

    /// Non-success HTTP status from the site
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response could not be parsed into programs
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Any other adapter-specific failure
    #[error("{message}")]
    Adapter { message: String },
}

fn human_duration(duration: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*duration)
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error bound to a path
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an XML parse error
    pub fn xml<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::Xml {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl FetchError {
    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a generic adapter error
    pub fn adapter<S: Into<String>>(message: S) -> Self {
        Self::Adapter {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_message_names_both_flags() {
        let message = AppError::MissingChannelSource.to_string();
        assert!(message.contains("--site"));
        assert!(message.contains("--channels"));
    }

    #[test]
    fn test_timeout_message_is_human_readable() {
        let err = FetchError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Request timed out after 1s 500ms");
    }
}
