//! # Docsearch Shared
//!
//! Document types and index schemas shared between the repository layer and
//! the demo binary.
//!
//! Every document type declares its own field mapping through
//! [`SearchDocument::schema`]; nothing relies on the engine inferring types
//! from the first write.

mod catalog_item;
mod document;
mod file_record;
mod schema;

pub use catalog_item::CatalogItem;
pub use document::SearchDocument;
pub use file_record::FileRecord;
pub use schema::{FieldType, IndexSchema};
