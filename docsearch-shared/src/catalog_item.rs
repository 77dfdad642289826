use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::SearchDocument;
use crate::schema::{FieldType, IndexSchema};

/// A catalog entry (title and description) keyed by UUID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

impl CatalogItem {
    /// Create a catalog item with a fresh identifier.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
        }
    }
}

impl SearchDocument for CatalogItem {
    fn schema() -> IndexSchema {
        IndexSchema::new()
            .field("id", FieldType::Keyword)
            .field("title", FieldType::TextWithKeyword)
            .field("description", FieldType::Text)
    }

    fn document_id(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_keyword() {
        assert_eq!(
            CatalogItem::schema().field_type("id"),
            Some(FieldType::Keyword)
        );
    }

    #[test]
    fn test_document_id_matches_uuid() {
        let item = CatalogItem::new("Title - 0", "Description - 0");
        assert_eq!(item.document_id(), Some(item.id.to_string()));
    }

    #[test]
    fn test_serialized_shape() {
        let item = CatalogItem::new("Title - 0", "Description - 0");
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["id"], item.id.to_string());
        assert_eq!(value["title"], "Title - 0");
        assert_eq!(value["description"], "Description - 0");
    }
}
