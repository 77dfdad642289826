//! # Docsearch
//!
//! Demo workflow for the docsearch document-search layer.
//!
//! This crate provides the configuration, dependency wiring, synthetic data
//! and the end-to-end run that exercises index lifecycle, writes, queries and
//! updates against a live engine.

pub mod config;
pub mod generators;
pub mod workflow;

pub use config::{AppConfig, Dependencies};
pub use workflow::{Demo, DemoReport};

use thiserror::Error;

/// Errors that can occur during demo initialization or execution.
#[derive(Error, Debug)]
pub enum DemoError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] docsearch_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DemoError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
