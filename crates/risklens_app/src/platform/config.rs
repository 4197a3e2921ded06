//! Runtime configuration, read from `RISKLENS_*` environment variables.

use std::time::Duration;

use risklens_core::DEFAULT_SOURCE_TAGS;
use risklens_engine::{FetchSettings, PollerConfig};

use super::logging::LogDestination;

/// Used when `RISKLENS_API_URL` is unset or empty.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

const DEFAULT_REFRESH_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("RISKLENS_LOG must be one of file, terminal, both; got {0:?}")]
    InvalidLogDestination(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base: String,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub source_tags: Vec<String>,
    pub log_destination: LogDestination,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset and blank values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_base = get("RISKLENS_API_URL")
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let refresh_secs = parse_positive(
            "RISKLENS_REFRESH_SECS",
            get("RISKLENS_REFRESH_SECS"),
            DEFAULT_REFRESH_SECS,
        )?;
        let timeout_ms = parse_positive(
            "RISKLENS_REQUEST_TIMEOUT_MS",
            get("RISKLENS_REQUEST_TIMEOUT_MS"),
            DEFAULT_REQUEST_TIMEOUT_MS,
        )?;

        let source_tags = match get("RISKLENS_SOURCE_TAGS") {
            Some(raw) => raw
                .split(',')
                .map(|tag| tag.trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect(),
            None => DEFAULT_SOURCE_TAGS.iter().map(|t| t.to_string()).collect(),
        };

        let log_destination = match get("RISKLENS_LOG") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidLogDestination)?,
            None => LogDestination::default(),
        };

        Ok(Self {
            api_base,
            refresh_interval: Duration::from_secs(refresh_secs),
            request_timeout: Duration::from_millis(timeout_ms),
            source_tags,
            log_destination,
        })
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: self.request_timeout,
            connect_timeout: self.request_timeout.min(FetchSettings::default().connect_timeout),
            ..FetchSettings::default()
        }
    }

    /// The cycle deadline leaves room for both requests plus parsing.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            refresh_interval: self.refresh_interval,
            cycle_timeout: self.request_timeout * 2,
            source_tags: self.source_tags.clone(),
        }
    }
}

fn parse_positive(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber { key, value: raw }),
    }
}
