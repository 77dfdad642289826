use serde::{de::DeserializeOwned, Serialize};

use crate::schema::IndexSchema;

/// A record that can be written to and read back from a search index.
///
/// Implementors declare their field mapping explicitly. If
/// [`document_id`](SearchDocument::document_id) returns `Some`, writes reuse that
/// identifier and overwrite any previous version; `None` lets the engine assign one.
pub trait SearchDocument: Serialize + DeserializeOwned + Send + Sync {
    /// The declared mapping for indices holding this document type.
    fn schema() -> IndexSchema;

    /// The document identifier, if the document carries one.
    fn document_id(&self) -> Option<String>;
}
