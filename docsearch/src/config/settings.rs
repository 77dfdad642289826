//! Application settings.
//!
//! Settings come from an optional JSON file, then environment variables
//! override individual values.

use std::env;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::DemoError;
use docsearch_repository::{ConnectionConfig, PollerConfig};

const ENV_URL: &str = "OPENSEARCH_URL";
const ENV_USERNAME: &str = "OPENSEARCH_USERNAME";
const ENV_PASSWORD: &str = "OPENSEARCH_PASSWORD";
const ENV_FILE_INDEX: &str = "FILE_INDEX";
const ENV_CATALOG_INDEX: &str = "CATALOG_INDEX";
const ENV_TIMEOUT_SECS: &str = "OPENSEARCH_TIMEOUT_SECS";
const ENV_POLL_INTERVAL_MS: &str = "POLL_INTERVAL_MS";
const ENV_POLL_TIMEOUT_SECS: &str = "POLL_TIMEOUT_SECS";

/// Poller settings as they appear in the settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    pub interval_ms: u64,
    pub timeout_secs: u64,
    pub max_attempts: Option<u32>,
}

impl Default for PollerSettings {
    fn default() -> Self {
        let defaults = PollerConfig::default();
        Self {
            interval_ms: defaults.interval.as_millis() as u64,
            timeout_secs: defaults.timeout.as_secs(),
            max_attempts: defaults.max_attempts,
        }
    }
}

impl PollerSettings {
    pub fn to_config(&self) -> PollerConfig {
        let config = PollerConfig::new(
            Duration::from_millis(self.interval_ms),
            Duration::from_secs(self.timeout_secs),
        );
        match self.max_attempts {
            Some(max) => config.with_max_attempts(max),
            None => config,
        }
    }
}

/// Top-level settings.
///
/// ```json
/// {
///   "engine": { "url": "http://localhost:9200", "file_index": "files", "catalog_index": "catalog" },
///   "poller": { "interval_ms": 100, "timeout_secs": 30 }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: ConnectionConfig,
    pub poller: PollerSettings,
}

impl AppConfig {
    /// Load settings from `path` (if given), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, DemoError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(|key| env::var(key).ok())
    }

    /// Read settings from a JSON file. Missing sections keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, DemoError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            DemoError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            DemoError::config(format!("Invalid settings file {}: {}", path.display(), e))
        })
    }

    /// Override values with whatever `lookup` returns for each variable.
    ///
    /// Blank values are treated as unset.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, DemoError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(ENV_URL) {
            self.engine.url = url;
        }
        if let Some(username) = get(ENV_USERNAME) {
            self.engine.username = Some(username);
        }
        if let Some(password) = get(ENV_PASSWORD) {
            self.engine.password = Some(password);
        }
        if let Some(index) = get(ENV_FILE_INDEX) {
            self.engine.file_index = index;
        }
        if let Some(index) = get(ENV_CATALOG_INDEX) {
            self.engine.catalog_index = index;
        }
        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            self.engine.timeout_secs = parse_number(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = get(ENV_POLL_INTERVAL_MS) {
            self.poller.interval_ms = parse_number(ENV_POLL_INTERVAL_MS, &value)?;
        }
        if let Some(value) = get(ENV_POLL_TIMEOUT_SECS) {
            self.poller.timeout_secs = parse_number(ENV_POLL_TIMEOUT_SECS, &value)?;
        }

        Ok(self)
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, DemoError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| DemoError::config(format!("{} must be a number, got {:?}: {}", key, value, e)))
}
