//! Shared test helpers.
#![allow(dead_code)]

use newsrag::config::COLLECTION_NAME;
use newsrag::domain::entities::record::EmbeddedArticle;
use newsrag::domain::error::DomainError;
use newsrag::domain::ports::embedding_port::EmbeddingProvider;
use newsrag::infrastructure::embeddings::noop::NoopProvider;
use newsrag::NewsRag;
use std::collections::HashMap;
use std::sync::Arc;

pub fn setup() -> NewsRag {
    NewsRag::with_providers(":memory:", COLLECTION_NAME, Arc::new(NoopProvider)).unwrap()
}

pub fn setup_with(provider: StaticProvider) -> NewsRag {
    NewsRag::with_providers(":memory:", COLLECTION_NAME, Arc::new(provider)).unwrap()
}

pub fn article(embedding: Vec<f32>, content: &str, title: &str, link: &str) -> EmbeddedArticle {
    EmbeddedArticle {
        id: None,
        embedding,
        content: content.to_string(),
        title: title.to_string(),
        link: link.to_string(),
    }
}

/// Embeds known query strings to fixed vectors. Anything else gets the
/// fallback vector, or an error when none is set.
pub struct StaticProvider {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Option<Vec<f32>>,
    dimension: usize,
}

impl StaticProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback: None,
            dimension,
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn fallback(mut self, vector: Vec<f32>) -> Self {
        self.fallback = Some(vector);
        self
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for StaticProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .or(self.fallback.as_ref())
                    .cloned()
                    .ok_or_else(|| DomainError::Embedding(format!("no vector for {t:?}")))
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
