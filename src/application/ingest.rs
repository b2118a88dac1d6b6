use crate::domain::entities::record::{EmbeddedArticle, Record};
use crate::domain::error::DomainError;
use crate::domain::ports::collection_store::CollectionStore;
use std::path::Path;
use std::sync::Arc;

pub struct IngestUseCase {
    store: Arc<dyn CollectionStore>,
    collection: String,
}

impl IngestUseCase {
    pub fn new(store: Arc<dyn CollectionStore>, collection: String) -> Self {
        Self { store, collection }
    }

    /// Reads a JSON array of embedded articles. Any malformed item fails the
    /// whole file.
    pub fn load_batch(path: &Path) -> Result<Vec<EmbeddedArticle>, DomainError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Io(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| DomainError::Parse(format!("{}: {e}", path.display())))
    }

    /// Upserts every item under its explicit id, or its position in the batch.
    /// Returns the number of records written.
    pub fn execute(&self, items: Vec<EmbeddedArticle>) -> Result<usize, DomainError> {
        self.store.get_or_create(&self.collection)?;

        let records: Vec<Record> = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.into_record(i))
            .collect();

        let written = self.store.upsert(&self.collection, &records)?;
        let total = self.store.count(&self.collection)?;
        tracing::info!(collection = %self.collection, records = written, total, "ingested batch");
        Ok(written)
    }

    pub fn execute_file(&self, path: &Path) -> Result<usize, DomainError> {
        let items = Self::load_batch(path)?;
        tracing::debug!(path = %path.display(), items = items.len(), "loaded ingestion batch");
        self.execute(items)
    }
}
