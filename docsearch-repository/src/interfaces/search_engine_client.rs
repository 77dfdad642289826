//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::types::{
    PointUpdate, ScriptedUpdate, SearchRequest, SearchResponse, UpdateByQueryResult, UpdateResult,
    WriteAck,
};
use docsearch_shared::IndexSchema;

/// Abstract interface for search engine operations.
///
/// Documents cross this boundary as JSON values so the trait stays object safe;
/// typed encoding and decoding happens in [`DocumentStore`](crate::DocumentStore).
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. A single handle is shared read-only by
/// every caller; no method mutates client state.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>`. Transport failures surface as
/// `EngineUnavailable`; malformed requests as one of the `*Rejected` variants.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Create an index bound to the given schema.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchError::SchemaRejected)` - If the engine rejects the definition,
    ///   including when the index already exists
    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<(), SearchError>;

    /// Delete an index.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the index existed and was deleted
    /// * `Ok(false)` - If there was no such index
    async fn delete_index(&self, index: &str) -> Result<bool, SearchError>;

    /// Check whether an index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// Make all acknowledged writes to the index visible to searches.
    async fn refresh_index(&self, index: &str) -> Result<(), SearchError>;

    /// Index a single document.
    ///
    /// With `Some(id)` the document is stored under that identifier, replacing any
    /// previous version. With `None` the engine assigns an identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(WriteAck)` - The write was accepted; it may not be searchable yet
    /// * `Err(SearchError::WriteRejected)` - If the document does not fit the mapping
    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        document: &Value,
    ) -> Result<WriteAck, SearchError>;

    /// Fetch the source of a document by identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The stored document source
    /// * `Err(SearchError::NotFound)` - If no document has that identifier
    async fn get_document(&self, index: &str, id: &str) -> Result<Value, SearchError>;

    /// Execute a search query.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - Hits ordered by descending score; empty when nothing matches
    /// * `Err(SearchError::QueryRejected)` - If the engine rejects the query
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = SearchRequest::new("files", Query::phrase("title", "site plan"));
    /// let response = client.search(&request).await?;
    /// println!("Found {} results", response.total);
    /// ```
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse<Value>, SearchError>;

    /// Run a script against every document matched by the request's filter.
    ///
    /// A filter that matches nothing yields `updated == 0`, not an error.
    async fn update_by_query(
        &self,
        request: &ScriptedUpdate,
    ) -> Result<UpdateByQueryResult, SearchError>;

    /// Write the given fields to an existing document.
    ///
    /// # Returns
    ///
    /// * `Ok(UpdateResult::Updated)` - If the stored document changed
    /// * `Ok(UpdateResult::Noop)` - If the values were already current
    /// * `Err(SearchError::NotFound)` - If the document doesn't exist
    async fn update_document(&self, request: &PointUpdate) -> Result<UpdateResult, SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the cluster reports green or yellow
    /// * `Ok(false)` - If the cluster is red
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
