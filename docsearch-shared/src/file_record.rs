use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::SearchDocument;
use crate::schema::{FieldType, IndexSchema};

/// A file attached to a section of an owning entity, denormalized for search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub section_id: String,
    pub section_name: String,
    pub section_number: String,
    pub file_name: String,
    pub content_type: String,
    pub title: String,
    /// Extracted free-text body of the file.
    pub file_text: String,
    pub created_on: DateTime<Utc>,
}

impl SearchDocument for FileRecord {
    fn schema() -> IndexSchema {
        IndexSchema::new()
            .field("id", FieldType::Keyword)
            .field("owner_id", FieldType::Keyword)
            .field("owner_name", FieldType::TextWithKeyword)
            .field("section_id", FieldType::Keyword)
            .field("section_name", FieldType::TextWithKeyword)
            .field("section_number", FieldType::Keyword)
            .field("file_name", FieldType::TextWithKeyword)
            .field("content_type", FieldType::Keyword)
            .field("title", FieldType::TextWithKeyword)
            .field("file_text", FieldType::Text)
            .field("created_on", FieldType::Date)
    }

    fn document_id(&self) -> Option<String> {
        if self.id.is_empty() {
            None
        } else {
            Some(self.id.clone())
        }
    }
}
