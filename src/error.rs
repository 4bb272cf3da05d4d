//! Error types for fetching and configuration.
//!
//! Fetch errors never abort a run: the curator logs them with their
//! [`FetchError::reason`] tag and carries on with the remaining sources.

use thiserror::Error;

/// Why a source adapter produced no candidates.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("rate limited by source")]
    RateLimited,

    #[error("resource not found")]
    NotFound,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("could not parse response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Short tag used as a structured log field.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::RateLimited => "rate-limit",
            FetchError::NotFound => "not-found",
            FetchError::Status(_) => "http-status",
            FetchError::Network(_) => "network",
            FetchError::Parse(_) => "parse-error",
        }
    }

    /// Map an HTTP status that is not a success onto a fetch error.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
            reqwest::StatusCode::NOT_FOUND => FetchError::NotFound,
            other => FetchError::Status(other.as_u16()),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::from_status(status)
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

/// Problems loading the curation profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
