//! # Docsearch Repository
//!
//! This crate provides the document-search layer over an external search
//! engine: index lifecycle, document writes, query construction, updates and
//! the consistency poller used to wait for search visibility. It includes
//! definitions for errors and interfaces, and a concrete implementation for
//! OpenSearch.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod poller;
pub mod types;

pub use client::DocumentStore;
pub use config::{ConnectionConfig, DocumentStoreConfig, PollerConfig};
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use opensearch::OpenSearchClient;
pub use poller::{ConsistencyPoller, PollOutcome};
pub use types::{
    BatchOperationResult, BatchOperationSummary, IndexAck, Page, PointUpdate, Query, Script,
    ScriptedUpdate, SearchHit, SearchRequest, SearchResponse, UpdateByQueryResult, UpdateResult,
    WriteAck, WriteResult,
};

pub use docsearch_shared::{CatalogItem, FieldType, FileRecord, IndexSchema, SearchDocument};
