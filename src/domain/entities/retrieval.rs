use crate::domain::entities::record::Metadata;
use crate::domain::ports::collection_store::ScoredRecord;
use serde::{Deserialize, Serialize};

/// Ranked documents for one query, most similar first.
///
/// `documents[i]` and `metadatas[i]` always describe the same record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<ScoredRecord> for RetrievalResult {
    fn from_iter<I: IntoIterator<Item = ScoredRecord>>(iter: I) -> Self {
        let (documents, metadatas) = iter
            .into_iter()
            .map(|scored| (scored.record.content, scored.record.metadata))
            .unzip();
        Self { documents, metadatas }
    }
}
