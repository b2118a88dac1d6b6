use crate::domain::error::DomainError;

#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;
    /// Length of the vectors `embed` returns. 0 means no embeddings.
    fn dimension(&self) -> usize;
}
