//! Search error types.
//!
//! This module defines the error types that can occur during search engine operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during search engine operations.
///
/// Malformed requests map to the `*Rejected` variants and are never retried.
/// A scripted update that matches nothing is not an error; see
/// [`UpdateByQueryResult::is_no_match`](crate::types::UpdateByQueryResult::is_no_match).
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// Transport failure, unreachable engine or engine-side (5xx) failure.
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine rejected an index definition or mapping.
    #[error("Schema rejected: {0}")]
    SchemaRejected(String),

    /// The engine rejected a document write or update.
    #[error("Write rejected: {0}")]
    WriteRejected(String),

    /// The query is malformed or references an invalid field.
    #[error("Query rejected: {0}")]
    QueryRejected(String),

    /// No document with the given identifier exists in the index.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a document for the search engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// The consistency poller gave up before the operation reported success.
    #[error("Gave up waiting for visibility after {attempts} attempt(s) in {elapsed:?}")]
    PollExhausted { attempts: u32, elapsed: Duration },
}

impl SearchError {
    /// Create an engine unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::EngineUnavailable(msg.into())
    }

    /// Create a schema rejected error.
    pub fn schema_rejected(msg: impl Into<String>) -> Self {
        Self::SchemaRejected(msg.into())
    }

    /// Create a write rejected error.
    pub fn write_rejected(msg: impl Into<String>) -> Self {
        Self::WriteRejected(msg.into())
    }

    /// Create a query rejected error.
    pub fn query_rejected(msg: impl Into<String>) -> Self {
        Self::QueryRejected(msg.into())
    }

    /// Create a document not found error.
    pub fn not_found(index: &str, id: &str) -> Self {
        Self::NotFound(format!("index={}, id={}", index, id))
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Whether the error describes a malformed request rather than an engine failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::SchemaRejected(_) | Self::WriteRejected(_) | Self::QueryRejected(_)
        )
    }
}
