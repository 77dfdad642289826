//! Request and response types for search engine operations.

use serde_json::{Map, Value};

use crate::errors::SearchError;

/// Default number of hits returned per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest `from + size` window the engine serves without scrolling.
pub const MAX_RESULT_WINDOW: u64 = 10_000;

/// Offset/limit pagination for searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub from: u64,
    pub size: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            from: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    pub fn new(from: u64, size: u64) -> Self {
        Self { from, size }
    }

    /// First page with the given size.
    pub fn first(size: u64) -> Self {
        Self { from: 0, size }
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.size == 0 {
            return Err(SearchError::query_rejected("page size must be at least 1"));
        }
        if self.from.saturating_add(self.size) > MAX_RESULT_WINDOW {
            return Err(SearchError::query_rejected(format!(
                "from + size must not exceed {}, got {}",
                MAX_RESULT_WINDOW,
                self.from.saturating_add(self.size)
            )));
        }
        Ok(())
    }
}

/// The query shapes supported by the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Exact (non-analyzed) value match, typically on a keyword field.
    Term { field: String, value: String },
    /// Analyzed full-text match; term order does not matter.
    Match { field: String, text: String },
    /// Contiguous phrase match after analysis.
    Phrase { field: String, phrase: String },
    /// Matches when any clause matches; scores combine across matching clauses.
    AnyOf(Vec<Query>),
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Match {
            field: field.into(),
            text: text.into(),
        }
    }

    pub fn phrase(field: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self::Phrase {
            field: field.into(),
            phrase: phrase.into(),
        }
    }

    pub fn any_of(clauses: Vec<Query>) -> Self {
        Self::AnyOf(clauses)
    }

    /// One text matched against several fields with OR semantics: an analyzed
    /// match on `match_field` and a phrase match on each of `phrase_fields`.
    pub fn any_field(text: &str, match_field: &str, phrase_fields: &[&str]) -> Self {
        let mut clauses = Vec::with_capacity(phrase_fields.len() + 1);
        clauses.push(Self::matches(match_field, text));
        clauses.extend(phrase_fields.iter().map(|field| Self::phrase(*field, text)));
        Self::AnyOf(clauses)
    }

    /// Reject queries the engine could never answer.
    pub fn validate(&self) -> Result<(), SearchError> {
        match self {
            Self::Term { field, .. } | Self::Match { field, .. } | Self::Phrase { field, .. } => {
                if field.trim().is_empty() {
                    return Err(SearchError::query_rejected("field name is required"));
                }
                Ok(())
            }
            Self::AnyOf(clauses) => {
                if clauses.is_empty() {
                    return Err(SearchError::query_rejected(
                        "boolean query needs at least one clause",
                    ));
                }
                clauses.iter().try_for_each(Query::validate)
            }
        }
    }
}

/// A query executed against a single index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub index: String,
    pub query: Query,
    pub page: Page,
}

impl SearchRequest {
    /// Create a request for the first page of `DEFAULT_PAGE_SIZE` hits.
    pub fn new(index: impl Into<String>, query: Query) -> Self {
        Self {
            index: index.into(),
            query,
            page: Page::default(),
        }
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.index.trim().is_empty() {
            return Err(SearchError::query_rejected("index name is required"));
        }
        self.page.validate()?;
        self.query.validate()
    }
}

/// A single search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<D> {
    pub id: String,
    /// Engine-assigned relevance; higher is better and not bounded to [0, 1].
    pub score: f64,
    pub document: D,
}

/// Hits for one page plus the engine's total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse<D> {
    pub total: u64,
    /// Ordered by descending score.
    pub hits: Vec<SearchHit<D>>,
}

impl<D> SearchResponse<D> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            hits: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn documents(&self) -> impl Iterator<Item = &D> {
        self.hits.iter().map(|hit| &hit.document)
    }

    pub fn max_score(&self) -> Option<f64> {
        self.hits.iter().map(|hit| hit.score).reduce(f64::max)
    }

    pub fn min_score(&self) -> Option<f64> {
        self.hits.iter().map(|hit| hit.score).reduce(f64::min)
    }
}

/// Outcome code of a document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Created,
    Updated,
}

/// Acknowledgment of an accepted (not necessarily visible) write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteAck {
    pub id: String,
    pub result: WriteResult,
    pub version: i64,
}

/// Acknowledgment of an index creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAck {
    pub index: String,
    /// Whether an existing index of the same name was deleted first.
    pub replaced: bool,
}

/// A server-side script and the parameters substituted into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub source: String,
    pub params: Map<String, Value>,
}

impl Script {
    pub fn new(source: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            source: source.into(),
            params,
        }
    }

    /// Build a script that assigns every parameter to the source field of the same name.
    ///
    /// Field names are spliced into the script source, so only plain identifiers are
    /// accepted; values always travel as parameters.
    pub fn assign(params: Map<String, Value>) -> Result<Self, SearchError> {
        if params.is_empty() {
            return Err(SearchError::write_rejected("script needs at least one field"));
        }

        let mut source = String::new();
        for field in params.keys() {
            if !is_identifier(field) {
                return Err(SearchError::write_rejected(format!(
                    "invalid script field name: {:?}",
                    field
                )));
            }
            source.push_str(&format!("ctx._source.{field} = params.{field};"));
        }

        Ok(Self { source, params })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Apply a script to every document matched by a filter query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedUpdate {
    pub index: String,
    pub filter: Query,
    pub script: Script,
}

impl ScriptedUpdate {
    pub fn new(index: impl Into<String>, filter: Query, script: Script) -> Self {
        Self {
            index: index.into(),
            filter,
            script,
        }
    }
}

/// Counts reported by a scripted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateByQueryResult {
    /// Documents matched by the filter.
    pub total: u64,
    /// Documents actually modified.
    pub updated: u64,
    /// Documents the script left unchanged.
    pub noops: u64,
}

impl UpdateByQueryResult {
    /// Nothing was modified. A valid outcome, not a failure.
    pub fn is_no_match(&self) -> bool {
        self.updated == 0
    }
}

/// Replace some or all fields of a document by identifier.
///
/// Only the fields present are written; other fields keep their values.
#[derive(Debug, Clone, PartialEq)]
pub struct PointUpdate {
    pub index: String,
    pub id: String,
    pub fields: Map<String, Value>,
}

impl PointUpdate {
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Set a field to write.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Check if any fields are set for update.
    pub fn has_updates(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// Result code of a point update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// The stored document changed.
    Updated,
    /// The submitted values equal the stored ones; nothing was written.
    Noop,
}

/// Result of a batch operation for a single item.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document identifier, when known.
    pub id: Option<String>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchError>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
#[derive(Debug, Clone)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            results: vec![],
        }
    }
}
