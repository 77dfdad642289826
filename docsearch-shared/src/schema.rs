//! Declared index schemas.

use std::collections::BTreeMap;

/// Search field types supported by the declared mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Exact-match, not analyzed.
    Keyword,
    /// Analyzed full text.
    Text,
    /// Analyzed full text with a `raw` keyword sub-field for exact matching.
    TextWithKeyword,
    /// Date/time value.
    Date,
    /// 64-bit integer.
    Long,
    /// Double precision float.
    Double,
    /// Boolean.
    Boolean,
}

impl FieldType {
    /// Whether the field is tokenized by an analyzer at index time.
    pub fn is_analyzed(&self) -> bool {
        matches!(self, FieldType::Text | FieldType::TextWithKeyword)
    }
}

/// A field name to field type mapping plus index settings.
///
/// Fields are kept in a `BTreeMap` so the generated mapping is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSchema {
    pub fields: BTreeMap<String, FieldType>,
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

impl IndexSchema {
    /// Create an empty schema with a single shard and one replica.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// Set the number of primary shards.
    pub fn with_shards(mut self, shards: u32) -> Self {
        self.number_of_shards = shards;
        self
    }

    /// Set the number of replicas.
    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.number_of_replicas = replicas;
        self
    }

    /// Look up the declared type of a field.
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
