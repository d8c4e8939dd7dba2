use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

mod endpoint;
mod retry;

pub use endpoint::Endpoint;
pub use retry::RetryStatusSet;

use crate::serializer::SerializerChoice;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid serializer: {0}")]
    InvalidSerializer(String),
    #[error("Invalid additional_headers entry: {0}")]
    InvalidHeaders(String),
    #[error("Invalid retry_statuses entry: {0}")]
    InvalidRetryStatuses(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Raw configuration surface as supplied by the host pipeline.
///
/// All delimited-string fields stay strings here; [`Config::validate`] parses
/// them exactly once into the strongly-typed [`Settings`] before any delivery
/// traffic starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Collector endpoint, absolute URL (required)
    pub endpoint_url: String,

    /// Comma-separated HTTP status codes that force a retryable outcome
    pub retry_statuses: String,

    /// Read timeout for the HTTP call, in seconds
    pub read_timeout_secs: f64,

    /// Open (connect) timeout for the HTTP call, in seconds
    pub open_timeout_secs: f64,

    /// Whether the record tag is sent with each event
    pub include_tag: bool,

    /// Whether the record time is sent with each event
    pub include_time: bool,

    /// Batch serializer name (json or msgpack)
    pub serializer: String,

    /// Retry the chunk on transport-level failures
    pub retry_on_connect_error: bool,

    /// Comma-separated `key=value` pairs added to every request
    pub additional_headers: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            retry_statuses: String::new(),
            read_timeout_secs: 2.0,
            open_timeout_secs: 2.0,
            include_tag: true,
            include_time: true,
            serializer: "json".to_string(),
            retry_on_connect_error: false,
            additional_headers: None,
        }
    }
}

/// Validated, immutable settings consumed by the delivery client.
///
/// Built once at configuration time and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: Endpoint,
    pub retry_statuses: RetryStatusSet,
    pub serializer: SerializerChoice,
    pub read_timeout: Duration,
    pub open_timeout: Duration,
    pub include_tag: bool,
    pub include_time: bool,
    pub retry_on_connect_error: bool,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Parses and validates every raw field, producing the typed [`Settings`].
    ///
    /// Runs exactly once, before any delivery traffic; any malformed value
    /// fails here rather than during a send.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        if self.endpoint_url.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "endpoint_url is required".to_string(),
            ));
        }

        let endpoint = Endpoint::parse(&self.endpoint_url, self.additional_headers.as_deref())?;
        let retry_statuses = RetryStatusSet::parse(&self.retry_statuses)?;

        let serializer = SerializerChoice::from_name(&self.serializer)
            .ok_or_else(|| ConfigError::InvalidSerializer(self.serializer.clone()))?;

        let read_timeout = timeout_from_secs("read_timeout_secs", self.read_timeout_secs)?;
        let open_timeout = timeout_from_secs("open_timeout_secs", self.open_timeout_secs)?;

        Ok(Settings {
            endpoint,
            retry_statuses,
            serializer,
            read_timeout,
            open_timeout,
            include_tag: self.include_tag,
            include_time: self.include_time,
            retry_on_connect_error: self.retry_on_connect_error,
        })
    }
}

fn timeout_from_secs(name: &str, secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidConfig(format!(
            "{name} must be a positive number of seconds, got {secs}"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}
