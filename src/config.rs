//! Process configuration.
//!
//! Storage location and collection name are fixed; environment variables only
//! override them for deployments and tests.

use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::infrastructure::embeddings::noop::NoopProvider;
use crate::infrastructure::embeddings::openai::OpenAiProvider;
use std::sync::Arc;

#[cfg(feature = "minilm")]
use crate::infrastructure::embeddings::minilm::MiniLmProvider;

pub const DEFAULT_DB_DIR: &str = "./chroma_db";
pub const COLLECTION_NAME: &str = "news_articles";
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_INPUT_FILE: &str = "embeddings.json";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
/// Database file created inside the storage directory.
pub const DB_FILE_NAME: &str = "newsrag.sqlite3";
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "minilm";

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_dir: String,
    pub collection: String,
    pub embedding: EmbeddingSettings,
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub provider: String,
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Directory holding `model.onnx` and `tokenizer.json` for `minilm`; downloaded when unset.
    pub model_dir: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_EMBEDDING_PROVIDER.into(),
            api_key: String::new(),
            model: None,
            base_url: None,
            model_dir: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            db_dir: std::env::var("NEWSRAG_DB_DIR").unwrap_or_else(|_| DEFAULT_DB_DIR.into()),
            collection: COLLECTION_NAME.into(),
            embedding: EmbeddingSettings {
                provider: std::env::var("NEWSRAG_EMBEDDING_PROVIDER").unwrap_or_else(|_| DEFAULT_EMBEDDING_PROVIDER.into()),
                api_key: std::env::var("NEWSRAG_EMBEDDING_API_KEY").unwrap_or_default(),
                model: std::env::var("NEWSRAG_EMBEDDING_MODEL").ok(),
                base_url: std::env::var("NEWSRAG_EMBEDDING_BASE_URL").ok(),
                model_dir: std::env::var("NEWSRAG_MODEL_DIR").ok(),
            },
        }
    }
}

impl EmbeddingSettings {
    pub fn build_provider(&self) -> Arc<dyn EmbeddingProvider> {
        match self.provider.as_str() {
            #[cfg(feature = "minilm")]
            "minilm" => Arc::new(MiniLmProvider::new(
                self.model.clone(),
                self.model_dir.as_ref().map(std::path::PathBuf::from),
            )),
            "openai" => Arc::new(OpenAiProvider::new(
                self.api_key.clone(),
                self.model.clone(),
                self.base_url.clone(),
            )),
            "noop" => Arc::new(NoopProvider),
            other => {
                tracing::warn!(provider = other, "unknown embedding provider, falling back to noop");
                Arc::new(NoopProvider)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "minilm")]
    #[test]
    fn minilm_is_the_default_provider() {
        let settings = EmbeddingSettings::default();
        assert_eq!(settings.provider, "minilm");
        assert_eq!(settings.build_provider().dimension(), 384);
    }

    #[test]
    fn provider_selection() {
        let openai = EmbeddingSettings {
            provider: "openai".into(),
            ..Default::default()
        };
        assert_eq!(openai.build_provider().dimension(), 1536);

        let unknown = EmbeddingSettings {
            provider: "mystery".into(),
            ..Default::default()
        };
        assert_eq!(unknown.build_provider().dimension(), 0);
    }
}
