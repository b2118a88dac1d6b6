use crate::domain::entities::collection::CollectionInfo;
use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: Record,
    pub score: f64,
}

/// Named, persistent collections of embedded records.
pub trait CollectionStore: Send + Sync {
    fn get_or_create(&self, name: &str) -> Result<CollectionInfo, DomainError>;
    fn info(&self, name: &str) -> Result<Option<CollectionInfo>, DomainError>;
    /// Insert-or-overwrite by id. The batch is applied atomically: either every
    /// record is written or none is.
    fn upsert(&self, collection: &str, records: &[Record]) -> Result<usize, DomainError>;
    fn query(&self, collection: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredRecord>, DomainError>;
    fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, DomainError>;
    fn count(&self, collection: &str) -> Result<usize, DomainError>;
}
