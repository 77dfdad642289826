//! OpenSearch query builders.
//!
//! This module turns the backend-neutral request types into OpenSearch
//! query DSL bodies.

use serde_json::{json, Value};

use crate::types::{PointUpdate, Query, ScriptedUpdate, SearchRequest};

/// Build the query DSL for a single query shape.
///
/// - `Term` becomes a `term` query (no analysis)
/// - `Match` becomes a `match` query (analyzed, order independent)
/// - `Phrase` becomes a `match_phrase` query (analyzed, contiguous, ordered)
/// - `AnyOf` becomes a `bool` query whose `should` clauses need at least one match
pub fn build_query(query: &Query) -> Value {
    match query {
        Query::Term { field, value } => json!({
            "term": { field: { "value": value } }
        }),
        Query::Match { field, text } => json!({
            "match": { field: { "query": text } }
        }),
        Query::Phrase { field, phrase } => json!({
            "match_phrase": { field: { "query": phrase } }
        }),
        Query::AnyOf(clauses) => {
            let should: Vec<Value> = clauses.iter().map(build_query).collect();
            json!({
                "bool": {
                    "should": should,
                    // A document must satisfy at least one clause
                    "minimum_should_match": 1
                }
            })
        }
    }
}

/// Build a search body including pagination.
pub fn build_search_body(request: &SearchRequest) -> Value {
    json!({
        "query": build_query(&request.query),
        "from": request.page.from,
        "size": request.page.size
    })
}

/// Build an `_update_by_query` body with a painless script.
pub fn build_update_by_query_body(request: &ScriptedUpdate) -> Value {
    json!({
        "query": build_query(&request.filter),
        "script": {
            "source": request.script.source,
            "lang": "painless",
            "params": request.script.params
        }
    })
}

/// Build a partial `_update` body.
///
/// `detect_noop` makes the engine report `noop` instead of rewriting a document
/// whose fields already hold the submitted values.
pub fn build_point_update_body(request: &PointUpdate) -> Value {
    json!({
        "doc": request.fields,
        "detect_noop": true
    })
}
