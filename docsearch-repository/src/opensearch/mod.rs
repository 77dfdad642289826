//! OpenSearch implementation of the search engine client.
//!
//! This module provides a concrete implementation of `SearchEngineClient`
//! using OpenSearch as the backend. The query and mapping bodies are also
//! accepted by Elasticsearch 7+.

mod client;
mod index_config;
mod queries;

pub use client::OpenSearchClient;
pub use index_config::{build_index_body, field_mapping};
pub use queries::{build_query, build_search_body};
