//! Typed document store.
//!
//! This module provides the main entry point for application code. It validates
//! requests locally, encodes and decodes documents, and delegates to a
//! [`SearchEngineClient`] for the wire work.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::DocumentStoreConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::poller::{ConsistencyPoller, PollOutcome};
use crate::types::{
    BatchOperationResult, BatchOperationSummary, IndexAck, PointUpdate, ScriptedUpdate,
    SearchHit, SearchRequest, SearchResponse, UpdateByQueryResult, UpdateResult, WriteAck,
};
use docsearch_shared::{IndexSchema, SearchDocument};

/// Index lifecycle, writes, queries and updates over one engine connection.
///
/// The store holds no mutable state; clone the engine handle to share it.
pub struct DocumentStore {
    engine: Arc<dyn SearchEngineClient>,
    config: DocumentStoreConfig,
}

impl DocumentStore {
    /// Create a new DocumentStore with default configuration.
    pub fn new(engine: Arc<dyn SearchEngineClient>) -> Self {
        Self {
            engine,
            config: DocumentStoreConfig::default(),
        }
    }

    /// Create a new DocumentStore with custom configuration.
    pub fn with_config(engine: Arc<dyn SearchEngineClient>, config: DocumentStoreConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &Arc<dyn SearchEngineClient> {
        &self.engine
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Delete `index` if present, then create it with `schema`.
    ///
    /// Running this twice with the same arguments leaves the same empty index.
    #[instrument(skip(self, schema), fields(field_count = schema.fields.len()))]
    pub async fn create_or_replace_index(
        &self,
        index: &str,
        schema: &IndexSchema,
    ) -> Result<IndexAck, SearchError> {
        validate_index_definition(index, schema)?;

        let replaced = self.engine.delete_index(index).await?;
        self.engine.create_index(index, schema).await?;

        info!(index = %index, replaced = replaced, "Created index");
        Ok(IndexAck {
            index: index.to_string(),
            replaced,
        })
    }

    /// Create `index` with `schema` unless it already exists.
    ///
    /// Returns whether the index was created. Existing data is left untouched.
    #[instrument(skip(self, schema))]
    pub async fn ensure_index(
        &self,
        index: &str,
        schema: &IndexSchema,
    ) -> Result<bool, SearchError> {
        validate_index_definition(index, schema)?;

        if self.engine.index_exists(index).await? {
            debug!(index = %index, "Index already exists");
            return Ok(false);
        }

        self.engine.create_index(index, schema).await?;
        info!(index = %index, "Created index");
        Ok(true)
    }

    /// Delete an index. Returns `false` if there was nothing to delete.
    pub async fn delete_index(&self, index: &str) -> Result<bool, SearchError> {
        if index.trim().is_empty() {
            return Err(SearchError::schema_rejected("index name is required"));
        }
        self.engine.delete_index(index).await
    }

    pub async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        if index.trim().is_empty() {
            return Err(SearchError::schema_rejected("index name is required"));
        }
        self.engine.index_exists(index).await
    }

    /// Make every acknowledged write to `index` visible to searches.
    pub async fn refresh_index(&self, index: &str) -> Result<(), SearchError> {
        if index.trim().is_empty() {
            return Err(SearchError::query_rejected("index name is required"));
        }
        self.engine.refresh_index(index).await
    }

    /// Write a document, overwriting any previous version with the same identifier.
    ///
    /// Success means the engine accepted the write. The document may not be
    /// searchable until the index refreshes.
    pub async fn upsert<D: SearchDocument>(
        &self,
        index: &str,
        document: &D,
    ) -> Result<WriteAck, SearchError> {
        if index.trim().is_empty() {
            return Err(SearchError::write_rejected("index name is required"));
        }

        let body = encode(document)?;
        let id = document.document_id();
        let ack = self
            .engine
            .index_document(index, id.as_deref(), &body)
            .await?;

        debug!(index = %index, id = %ack.id, result = ?ack.result, "Upserted document");
        Ok(ack)
    }

    /// Write several documents to the same index.
    ///
    /// Individual failures are reported in the summary rather than aborting the
    /// batch. The batch size is limited by the configured max_batch_size
    /// (default: 1000).
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn upsert_batch<D: SearchDocument>(
        &self,
        index: &str,
        documents: &[D],
    ) -> Result<BatchOperationSummary, SearchError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        self.validate_batch_size(documents.len())?;

        if index.trim().is_empty() {
            return Err(SearchError::write_rejected("index name is required"));
        }

        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            let id = document.document_id();
            let outcome = match encode(document) {
                Ok(body) => self.engine.index_document(index, id.as_deref(), &body).await,
                Err(e) => Err(e),
            };

            results.push(match outcome {
                Ok(ack) => BatchOperationResult {
                    id: Some(ack.id),
                    success: true,
                    error: None,
                },
                Err(e) => BatchOperationResult {
                    id,
                    success: false,
                    error: Some(e),
                },
            });
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        let summary = BatchOperationSummary {
            total: documents.len(),
            succeeded,
            failed: documents.len() - succeeded,
            results,
        };

        info!(
            index = %index,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch upsert completed"
        );
        Ok(summary)
    }

    /// Read a document back by identifier.
    pub async fn get<D: DeserializeOwned>(&self, index: &str, id: &str) -> Result<D, SearchError> {
        if id.trim().is_empty() {
            return Err(SearchError::not_found(index, id));
        }

        let source = self.engine.get_document(index, id).await?;
        decode(source)
    }

    /// Execute a search and decode each hit into `D`.
    ///
    /// Zero matches yields an empty response, not an error.
    pub async fn search<D: DeserializeOwned>(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse<D>, SearchError> {
        request.validate()?;

        let response = self.engine.search(request).await?;
        let hits = response
            .hits
            .into_iter()
            .map(|hit| {
                Ok(SearchHit {
                    id: hit.id,
                    score: hit.score,
                    document: decode(hit.document)?,
                })
            })
            .collect::<Result<Vec<_>, SearchError>>()?;

        debug!(
            index = %request.index,
            total = response.total,
            returned = hits.len(),
            "Search completed"
        );
        Ok(SearchResponse {
            total: response.total,
            hits,
        })
    }

    /// Repeat a search until it returns at least one hit.
    pub async fn search_until_visible<D: DeserializeOwned>(
        &self,
        request: &SearchRequest,
        poller: &ConsistencyPoller,
    ) -> Result<SearchResponse<D>, SearchError> {
        // Fail fast instead of polling a request that can never succeed
        request.validate()?;

        poller
            .poll(|| async move {
                let response = self.search::<D>(request).await?;
                if response.is_empty() {
                    Ok::<_, SearchError>(PollOutcome::Pending)
                } else {
                    Ok(PollOutcome::Ready(response))
                }
            })
            .await
    }

    /// Apply a script to every document matching the filter.
    ///
    /// A filter that matches nothing is reported through
    /// [`UpdateByQueryResult::is_no_match`], not as an error.
    #[instrument(skip(self, request), fields(index = %request.index))]
    pub async fn update_by_query(
        &self,
        request: &ScriptedUpdate,
    ) -> Result<UpdateByQueryResult, SearchError> {
        if request.index.trim().is_empty() {
            return Err(SearchError::write_rejected("index name is required"));
        }
        if request.script.source.trim().is_empty() {
            return Err(SearchError::write_rejected("script source is required"));
        }
        request.filter.validate()?;

        let result = self.engine.update_by_query(request).await?;
        info!(
            total = result.total,
            updated = result.updated,
            noops = result.noops,
            "Update by query completed"
        );
        Ok(result)
    }

    /// Write the given fields to the document with the request's identifier.
    #[instrument(skip(self, request), fields(index = %request.index, id = %request.id))]
    pub async fn update_document(
        &self,
        request: &PointUpdate,
    ) -> Result<UpdateResult, SearchError> {
        if request.index.trim().is_empty() {
            return Err(SearchError::write_rejected("index name is required"));
        }
        if request.id.trim().is_empty() {
            return Err(SearchError::write_rejected("document id is required"));
        }
        if !request.has_updates() {
            return Err(SearchError::write_rejected("no fields to update"));
        }

        let result = self.engine.update_document(request).await?;
        info!(result = ?result, "Point update completed");
        Ok(result)
    }

    /// Check if the engine is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool, SearchError> {
        self.engine.health_check().await
    }
}

fn validate_index_definition(index: &str, schema: &IndexSchema) -> Result<(), SearchError> {
    if index.trim().is_empty() {
        return Err(SearchError::schema_rejected("index name is required"));
    }
    if index.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(SearchError::schema_rejected(format!(
            "index name must be lowercase: {}",
            index
        )));
    }
    if schema.is_empty() {
        return Err(SearchError::schema_rejected(format!(
            "schema for index {} declares no fields",
            index
        )));
    }
    Ok(())
}

fn encode<D: SearchDocument>(document: &D) -> Result<Value, SearchError> {
    serde_json::to_value(document).map_err(|e| SearchError::serialization(e.to_string()))
}

fn decode<D: DeserializeOwned>(source: Value) -> Result<D, SearchError> {
    serde_json::from_value(source)
        .map_err(|e| SearchError::parse(format!("Failed to decode document: {}", e)))
}
