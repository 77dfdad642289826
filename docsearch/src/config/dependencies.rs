//! Dependency initialization and wiring for the demo.

use std::sync::Arc;
use tracing::info;

use super::AppConfig;
use crate::DemoError;
use docsearch_repository::{
    ConsistencyPoller, DocumentStore, OpenSearchClient, SearchEngineClient,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The document store shared by every workflow step.
    pub store: DocumentStore,
    /// Poller used to wait for writes to become visible.
    pub poller: ConsistencyPoller,
    pub config: AppConfig,
}

impl Dependencies {
    /// Connect to the engine and verify it is healthy.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(DemoError::SearchError)` - If the client cannot be built or the engine is unreachable
    /// * `Err(DemoError::ConfigError)` - If the cluster reports itself unhealthy
    pub async fn new(config: AppConfig) -> Result<Self, DemoError> {
        info!(
            opensearch_url = %config.engine.url,
            file_index = %config.engine.file_index,
            catalog_index = %config.engine.catalog_index,
            "Initializing dependencies"
        );

        let client = OpenSearchClient::new(&config.engine).await?;

        // Verify OpenSearch is reachable
        let healthy = client.health_check().await?;

        if !healthy {
            return Err(DemoError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        Ok(Self::from_parts(Arc::new(client), config))
    }

    /// Wire dependencies around an existing engine client.
    pub fn from_parts(engine: Arc<dyn SearchEngineClient>, config: AppConfig) -> Self {
        Self {
            store: DocumentStore::new(engine),
            poller: ConsistencyPoller::new(config.poller.to_config()),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsearch_repository::{ConnectionConfig, SearchError};

    #[tokio::test]
    async fn test_unreachable_engine_is_search_error() {
        let config = AppConfig {
            engine: ConnectionConfig::new("http://127.0.0.1:1"),
            ..AppConfig::default()
        };

        let result = Dependencies::new(config).await;

        assert!(matches!(
            result,
            Err(DemoError::SearchError(SearchError::EngineUnavailable(_)))
        ));
    }
}
