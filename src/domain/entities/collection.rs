use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    /// Embedding length fixed by the first upsert. `None` until then.
    pub dimension: Option<usize>,
    pub count: usize,
    pub created_at: DateTime<Utc>,
}
