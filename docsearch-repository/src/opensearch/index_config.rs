//! OpenSearch index settings and mappings.
//!
//! Translates a declared [`IndexSchema`] into an index creation body.

use serde_json::{json, Map, Value};

use docsearch_shared::{FieldType, IndexSchema};

/// Keyword values longer than this are not indexed in `raw` sub-fields.
const RAW_IGNORE_ABOVE: u32 = 256;

/// Mapping for a single field type.
pub fn field_mapping(field_type: FieldType) -> Value {
    match field_type {
        FieldType::Keyword => json!({ "type": "keyword" }),
        FieldType::Text => json!({ "type": "text" }),
        FieldType::TextWithKeyword => json!({
            "type": "text",
            "fields": {
                "raw": {
                    "type": "keyword",
                    "ignore_above": RAW_IGNORE_ABOVE
                }
            }
        }),
        FieldType::Date => json!({ "type": "date" }),
        FieldType::Long => json!({ "type": "long" }),
        FieldType::Double => json!({ "type": "double" }),
        FieldType::Boolean => json!({ "type": "boolean" }),
    }
}

/// Get the index settings and mappings for a declared schema.
///
/// Mappings are `strict`: the engine rejects documents carrying fields the
/// schema does not declare instead of guessing their types.
pub fn build_index_body(schema: &IndexSchema) -> Value {
    let properties: Map<String, Value> = schema
        .fields
        .iter()
        .map(|(name, field_type)| (name.clone(), field_mapping(*field_type)))
        .collect();

    json!({
        "settings": {
            "number_of_shards": schema.number_of_shards,
            "number_of_replicas": schema.number_of_replicas
        },
        "mappings": {
            "dynamic": "strict",
            "properties": properties
        }
    })
}
