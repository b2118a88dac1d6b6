use crate::domain::entities::retrieval::RetrievalResult;
use crate::domain::error::DomainError;
use crate::domain::ports::collection_store::CollectionStore;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use std::sync::Arc;

pub struct RetrieveUseCase {
    store: Arc<dyn CollectionStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    collection: String,
}

impl RetrieveUseCase {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        collection: String,
    ) -> Self {
        Self { store, embedder, collection }
    }

    pub async fn execute(&self, query: &str, top_k: usize) -> Result<RetrievalResult, DomainError> {
        if top_k == 0 {
            return Err(DomainError::InvalidInput("top_k must be a positive integer".into()));
        }

        let info = self.store.get_or_create(&self.collection)?;
        if info.count == 0 {
            return Ok(RetrievalResult::default());
        }

        let vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Embedding("provider returned no vector for the query".into()))?;

        if vector.is_empty() {
            return Err(DomainError::Embedding(
                "no query embedding available; set NEWSRAG_EMBEDDING_PROVIDER to minilm or openai".into(),
            ));
        }
        if let Some(dim) = info.dimension {
            if dim != vector.len() {
                return Err(DomainError::Embedding(format!(
                    "query embedding dimension {} does not match collection dimension {dim}",
                    vector.len()
                )));
            }
        }

        // The full-table cosine scan is CPU and disk bound; keep it off the async workers.
        let store = self.store.clone();
        let collection = self.collection.clone();
        let hits = tokio::task::spawn_blocking(move || store.query(&collection, &vector, top_k))
            .await
            .map_err(|e| DomainError::Database(format!("query task failed: {e}")))??;

        tracing::debug!(hits = hits.len(), top_k, "query ranked");
        Ok(hits.into_iter().collect())
    }
}
