//! Configuration types for the engine connection, the document store and the poller.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Default engine URL.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:9200";

/// Default name of the file index.
pub const DEFAULT_FILE_INDEX: &str = "files";

/// Default name of the catalog index.
pub const DEFAULT_CATALOG_INDEX: &str = "catalog";

fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for the search engine.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Engine base URL (e.g. "http://localhost:9200").
    pub url: String,
    pub file_index: String,
    pub catalog_index: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENGINE_URL.to_string(),
            file_index: DEFAULT_FILE_INDEX.to_string(),
            catalog_index: DEFAULT_CATALOG_INDEX.to_string(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ConnectionConfig {
    /// Create a config pointing at `url` with default index names.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set basic-auth credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Basic-auth credentials, only when both username and password are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("file_index", &self.file_index)
            .field("catalog_index", &self.catalog_index)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Configuration for the DocumentStore.
#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    /// Maximum number of documents allowed in a single batch operation.
    /// Set to None to disable the limit (not recommended for production).
    pub max_batch_size: Option<usize>,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
        }
    }
}

impl DocumentStoreConfig {
    /// Create a config with no batch size limit (use with caution).
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }
}

/// Configuration for the consistency poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Fixed delay between attempts.
    pub interval: Duration,
    /// Overall deadline measured from the first attempt.
    pub timeout: Duration,
    /// Optional cap on the number of attempts.
    pub max_attempts: Option<u32>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(30),
            max_attempts: None,
        }
    }
}

impl PollerConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            max_attempts: None,
        }
    }

    /// Cap the number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}
