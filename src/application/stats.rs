use crate::domain::entities::collection::CollectionInfo;
use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::collection_store::CollectionStore;
use std::sync::Arc;

pub struct StatsUseCase {
    store: Arc<dyn CollectionStore>,
    collection: String,
}

impl StatsUseCase {
    pub fn new(store: Arc<dyn CollectionStore>, collection: String) -> Self {
        Self { store, collection }
    }

    /// Read-only: never creates the collection.
    pub fn stats(&self) -> Result<CollectionInfo, DomainError> {
        self.store
            .info(&self.collection)?
            .ok_or_else(|| DomainError::NotFound(format!("collection {}", self.collection)))
    }

    pub fn record(&self, id: &str) -> Result<Option<Record>, DomainError> {
        self.store.get(&self.collection, id)
    }
}
