//! The end-to-end demo run.
//!
//! Prepares both indices, writes the two collections concurrently, then waits
//! for each query and update to observe the writes.

use serde_json::{json, Map};
use tracing::{info, instrument, warn};

use crate::config::Dependencies;
use crate::generators::DataGenerator;
use crate::DemoError;
use docsearch_repository::{
    ConsistencyPoller, DocumentStore, Page, PointUpdate, PollOutcome, Query, Script,
    ScriptedUpdate, SearchError, SearchRequest, UpdateResult,
};
use docsearch_shared::{CatalogItem, FileRecord, SearchDocument};

/// Text searched for with an analyzed match.
pub const ANY_MATCH_TEXT: &str = "runs and jumps";

pub const SCRIPTED_TITLE: &str = "new title";
pub const SCRIPTED_DESCRIPTION: &str = "new desc";

pub const POINT_UPDATE_TITLE: &str = "Updated from update";
pub const POINT_UPDATE_DESCRIPTION: &str = "also update from update";

/// What each step of a run observed.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub files_inserted: usize,
    pub catalog_inserted: usize,
    pub exact_title_matches: usize,
    pub any_matches: usize,
    pub bool_or_matches: usize,
    pub updated_by_query: u64,
    pub point_update: UpdateResult,
}

/// Runs the workflow against the configured indices.
pub struct Demo<'a> {
    store: &'a DocumentStore,
    poller: &'a ConsistencyPoller,
    file_index: &'a str,
    catalog_index: &'a str,
}

impl<'a> Demo<'a> {
    pub fn new(deps: &'a Dependencies) -> Self {
        Self {
            store: &deps.store,
            poller: &deps.poller,
            file_index: &deps.config.engine.file_index,
            catalog_index: &deps.config.engine.catalog_index,
        }
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn run(
        &self,
        generator: &mut DataGenerator,
        documents: usize,
    ) -> Result<DemoReport, DemoError> {
        if documents == 0 {
            return Err(DemoError::config(
                "at least one document per collection is required",
            ));
        }

        self.prepare_indices().await?;

        let files = generator.file_records(documents);
        let catalog = generator.catalog_items(documents);

        let (files_inserted, catalog_inserted) =
            tokio::try_join!(self.insert_files(&files), self.insert_catalog(&catalog))?;

        // Both collections are non-empty at this point
        let (first_file, first_item, last_item) =
            match (files.first(), catalog.first(), catalog.last()) {
                (Some(file), Some(first), Some(last)) => (file, first, last),
                _ => return Err(DemoError::config("no documents were generated")),
            };

        let exact_title_matches = self.search_exact_title(first_file).await?;
        let any_matches = self.search_any_match().await?;
        let bool_or_matches = self.bool_or_search(first_file).await?;

        // With a single document both updates target the same item, so the
        // scripted values are verified before the point update replaces them
        let updated_by_query = self.update_by_query(first_item).await?;
        self.verify_scripted_update(first_item).await?;
        let point_update = self.point_update(last_item).await?;

        Ok(DemoReport {
            files_inserted,
            catalog_inserted,
            exact_title_matches,
            any_matches,
            bool_or_matches,
            updated_by_query,
            point_update,
        })
    }

    /// Recreate the catalog index and make sure the file index exists.
    #[instrument(skip(self))]
    pub async fn prepare_indices(&self) -> Result<(), DemoError> {
        let ack = self
            .store
            .create_or_replace_index(self.catalog_index, &CatalogItem::schema())
            .await?;
        info!(index = %ack.index, replaced = ack.replaced, "Catalog index ready");

        let created = self
            .store
            .ensure_index(self.file_index, &FileRecord::schema())
            .await?;
        info!(index = %self.file_index, created = created, "File index ready");
        Ok(())
    }

    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn insert_files(&self, files: &[FileRecord]) -> Result<usize, DemoError> {
        for file in files {
            let ack = self.store.upsert(self.file_index, file).await?;
            info!(title = %file.title, id = %ack.id, "Inserted file");
        }
        Ok(files.len())
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn insert_catalog(&self, items: &[CatalogItem]) -> Result<usize, DemoError> {
        let summary = self.store.upsert_batch(self.catalog_index, items).await?;

        for (item, result) in items.iter().zip(&summary.results) {
            if result.success {
                info!(
                    title = %item.title,
                    id = %result.id.as_deref().unwrap_or_default(),
                    "Inserted catalog item"
                );
            }
        }

        if let Some(error) = summary.results.into_iter().find_map(|result| result.error) {
            return Err(error.into());
        }
        Ok(summary.succeeded)
    }

    /// Phrase search for the exact title of `file`.
    #[instrument(skip(self, file))]
    pub async fn search_exact_title(&self, file: &FileRecord) -> Result<usize, DemoError> {
        let request = SearchRequest::new(self.file_index, Query::phrase("title", &file.title));
        let response = self
            .store
            .search_until_visible::<FileRecord>(&request, self.poller)
            .await?;

        info!(
            title = %file.title,
            count = response.hits.len(),
            "Exact title search found matches"
        );
        Ok(response.hits.len())
    }

    /// Analyzed search over the file text, first page of ten.
    #[instrument(skip(self))]
    pub async fn search_any_match(&self) -> Result<usize, DemoError> {
        info!(text = ANY_MATCH_TEXT, "Searching file text");

        let query = Query::matches("file_text", ANY_MATCH_TEXT);
        let request = SearchRequest::new(self.file_index, query).with_page(Page::new(0, 10));
        let response = self
            .store
            .search_until_visible::<FileRecord>(&request, self.poller)
            .await?;

        info!(
            count = response.hits.len(),
            total = response.total,
            high_score = response.max_score().unwrap_or_default(),
            low_score = response.min_score().unwrap_or_default(),
            "Any-match search found matches"
        );
        Ok(response.hits.len())
    }

    /// Search the file name of `file` across the text, title and file name fields.
    #[instrument(skip(self, file))]
    pub async fn bool_or_search(&self, file: &FileRecord) -> Result<usize, DemoError> {
        let query = Query::any_field(&file.file_name, "file_text", &["title", "file_name"]);
        let request = SearchRequest::new(self.file_index, query).with_page(Page::new(0, 10));
        let response = self
            .store
            .search_until_visible::<FileRecord>(&request, self.poller)
            .await?;

        info!(
            text = %file.file_name,
            count = response.hits.len(),
            "Boolean OR search found matches"
        );
        Ok(response.hits.len())
    }

    /// Rewrite the title and description of `item` with a script, selected by id.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub async fn update_by_query(&self, item: &CatalogItem) -> Result<u64, DemoError> {
        let mut params = Map::new();
        params.insert("title".to_string(), json!(SCRIPTED_TITLE));
        params.insert("description".to_string(), json!(SCRIPTED_DESCRIPTION));

        let update = ScriptedUpdate::new(
            self.catalog_index,
            Query::term("id", item.id.to_string()),
            Script::assign(params)?,
        );
        let update = &update;

        // The filter only sees the item once it is searchable
        let result = self
            .poller
            .poll(|| async move {
                let result = self.store.update_by_query(update).await?;
                if result.is_no_match() {
                    Ok::<_, SearchError>(PollOutcome::Pending)
                } else {
                    Ok(PollOutcome::Ready(result))
                }
            })
            .await?;

        info!(updated = result.updated, "Scripted update applied");
        Ok(result.updated)
    }

    /// Replace the title and description of `item` by identifier.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub async fn point_update(&self, item: &CatalogItem) -> Result<UpdateResult, DemoError> {
        let request = PointUpdate::new(self.catalog_index, item.id.to_string())
            .with_field("title", POINT_UPDATE_TITLE)
            .with_field("description", POINT_UPDATE_DESCRIPTION);
        let request = &request;

        let result = self
            .poller
            .poll(|| async move {
                match self.store.update_document(request).await {
                    Ok(UpdateResult::Noop) => {
                        warn!("Document already held the submitted values");
                        Ok(PollOutcome::Ready(UpdateResult::Noop))
                    }
                    Ok(result) => Ok(PollOutcome::Ready(result)),
                    // Updates by id are realtime, so a missing document stays missing
                    Err(e) => Err(e),
                }
            })
            .await?;

        info!(result = ?result, "Point update applied");
        Ok(result)
    }

    /// Read `item` back until the scripted values are visible.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub async fn verify_scripted_update(
        &self,
        item: &CatalogItem,
    ) -> Result<CatalogItem, DemoError> {
        let id = item.id.to_string();
        let id = id.as_str();

        let stored = self
            .poller
            .poll(|| async move {
                let stored: CatalogItem = self.store.get(self.catalog_index, id).await?;
                if stored.title == SCRIPTED_TITLE {
                    Ok::<_, SearchError>(PollOutcome::Ready(stored))
                } else {
                    Ok(PollOutcome::Pending)
                }
            })
            .await?;

        info!(
            title = %stored.title,
            description = %stored.description,
            "Verified scripted update"
        );
        Ok(stored)
    }
}
