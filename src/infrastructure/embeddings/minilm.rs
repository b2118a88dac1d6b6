//! Local all-MiniLM-L6-v2 sentence embeddings through ONNX Runtime.
//!
//! Produces mean-pooled, L2-normalised 384-dimensional vectors, the same
//! representation the upstream article embeddings are generated with, so query
//! vectors rank directly against ingested ones. The model and tokenizer are
//! fetched from the Hugging Face hub on first use, or read from a local
//! directory holding `model.onnx` and `tokenizer.json`.

use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use hf_hub::api::tokio::Api;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tokio::sync::OnceCell;

pub const MINILM_DIMENSION: usize = 384;
pub const DEFAULT_MINILM_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";
const MAX_SEQUENCE_LENGTH: usize = 256;

struct LoadedModel {
    session: Session,
    tokenizer: Tokenizer,
}

pub struct MiniLmProvider {
    repo: String,
    model_dir: Option<PathBuf>,
    model: OnceCell<Arc<Mutex<LoadedModel>>>,
}

fn embedding_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::Embedding(format!("{context}: {e}"))
}

impl MiniLmProvider {
    /// Nothing is loaded until the first `embed` call.
    pub fn new(repo: Option<String>, model_dir: Option<PathBuf>) -> Self {
        Self {
            repo: repo.unwrap_or_else(|| DEFAULT_MINILM_REPO.to_string()),
            model_dir,
            model: OnceCell::new(),
        }
    }

    async fn model(&self) -> Result<Arc<Mutex<LoadedModel>>, DomainError> {
        self.model
            .get_or_try_init(|| async {
                let (model_path, tokenizer_path) = self.resolve_files().await?;
                tokio::task::spawn_blocking(move || load_model(&model_path, &tokenizer_path))
                    .await
                    .map_err(|e| DomainError::Embedding(format!("model load task failed: {e}")))?
                    .map(|m| Arc::new(Mutex::new(m)))
            })
            .await
            .cloned()
    }

    async fn resolve_files(&self) -> Result<(PathBuf, PathBuf), DomainError> {
        if let Some(dir) = &self.model_dir {
            return Ok((dir.join("model.onnx"), dir.join("tokenizer.json")));
        }

        tracing::info!(repo = %self.repo, "fetching embedding model from Hugging Face hub");
        let api = Api::new().map_err(|e| embedding_error("hub client", e))?;
        let repo = api.model(self.repo.clone());
        let tokenizer = repo
            .get("tokenizer.json")
            .await
            .map_err(|e| embedding_error("download tokenizer.json", e))?;
        let model = repo
            .get("onnx/model.onnx")
            .await
            .map_err(|e| embedding_error("download onnx/model.onnx", e))?;
        Ok((model, tokenizer))
    }
}

fn load_model(model_path: &Path, tokenizer_path: &Path) -> Result<LoadedModel, DomainError> {
    let mut tokenizer = Tokenizer::from_file(tokenizer_path)
        .map_err(|e| embedding_error("load tokenizer", e))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_SEQUENCE_LENGTH,
            ..Default::default()
        }))
        .map_err(|e| embedding_error("configure truncation", e))?;

    let session = Session::builder()
        .map_err(|e| embedding_error("session builder", e))?
        .with_optimization_level(GraphOptimizationLevel::Level1)
        .map_err(|e| embedding_error("optimization level", e))?
        .commit_from_file(model_path)
        .map_err(|e| embedding_error("load ONNX model", e))?;

    tracing::info!(model = %model_path.display(), "embedding model loaded");
    Ok(LoadedModel { session, tokenizer })
}

fn compute_embeddings(model: &mut LoadedModel, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let encodings = model
        .tokenizer
        .encode_batch(text_refs, true)
        .map_err(|e| embedding_error("tokenize", e))?;

    let batch = BatchTokens::from_encodings(&encodings);
    let shape = [batch.batch, batch.length];
    let ids = Tensor::from_array((shape, batch.ids.into_boxed_slice()))
        .map_err(|e| embedding_error("input_ids tensor", e))?;
    let mask = Tensor::from_array((shape, batch.mask.clone().into_boxed_slice()))
        .map_err(|e| embedding_error("attention_mask tensor", e))?;
    let type_ids = Tensor::from_array((shape, batch.type_ids.into_boxed_slice()))
        .map_err(|e| embedding_error("token_type_ids tensor", e))?;

    let outputs = model
        .session
        .run(ort::inputs![
            "input_ids" => ids,
            "attention_mask" => mask,
            "token_type_ids" => type_ids
        ])
        .map_err(|e| embedding_error("inference", e))?;

    let hidden = outputs
        .get("last_hidden_state")
        .ok_or_else(|| DomainError::Embedding("model has no last_hidden_state output".into()))?;
    let (_shape, data) = hidden
        .try_extract_tensor::<f32>()
        .map_err(|e| embedding_error("read output", e))?;

    let hidden_size = data.len() / (batch.batch * batch.length).max(1);
    Ok(mean_pool(data, &batch.mask, batch.batch, batch.length, hidden_size)
        .into_iter()
        .map(normalize)
        .collect())
}

/// Token ids padded to the longest sequence in the batch, row-major.
struct BatchTokens {
    ids: Vec<i64>,
    mask: Vec<i64>,
    type_ids: Vec<i64>,
    batch: usize,
    length: usize,
}

impl BatchTokens {
    fn from_encodings(encodings: &[tokenizers::Encoding]) -> Self {
        let batch = encodings.len();
        let length = encodings.iter().map(|e| e.len()).max().unwrap_or(0);
        let mut tokens = Self {
            ids: Vec::with_capacity(batch * length),
            mask: Vec::with_capacity(batch * length),
            type_ids: Vec::with_capacity(batch * length),
            batch,
            length,
        };
        for encoding in encodings {
            let (ids, mask, types) = (encoding.get_ids(), encoding.get_attention_mask(), encoding.get_type_ids());
            for i in 0..length {
                tokens.ids.push(ids.get(i).map_or(0, |&v| v as i64));
                tokens.mask.push(mask.get(i).map_or(0, |&v| v as i64));
                tokens.type_ids.push(types.get(i).map_or(0, |&v| v as i64));
            }
        }
        tokens
    }
}

/// Averages token states over unmasked positions. `hidden` is `[batch, length, hidden_size]`.
fn mean_pool(hidden: &[f32], mask: &[i64], batch: usize, length: usize, hidden_size: usize) -> Vec<Vec<f32>> {
    (0..batch)
        .map(|b| {
            let mut pooled = vec![0.0f32; hidden_size];
            let mut tokens = 0.0f32;
            for t in 0..length {
                if mask[b * length + t] == 0 {
                    continue;
                }
                tokens += 1.0;
                let start = (b * length + t) * hidden_size;
                for (acc, v) in pooled.iter_mut().zip(&hidden[start..start + hidden_size]) {
                    *acc += v;
                }
            }
            if tokens > 0.0 {
                pooled.iter_mut().for_each(|v| *v /= tokens);
            }
            pooled
        })
        .collect()
}

fn normalize(vector: Vec<f32>) -> Vec<f32> {
    let magnitude = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        vector.into_iter().map(|x| x / magnitude).collect()
    } else {
        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MiniLmProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let model = self.model().await?;
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|e| DomainError::Embedding(format!("model lock poisoned: {e}")))?;
            compute_embeddings(&mut model, &texts)
        })
        .await
        .map_err(|e| DomainError::Embedding(format!("embedding task failed: {e}")))?
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }
}
