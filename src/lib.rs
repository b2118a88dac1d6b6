pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod server;

use crate::application::ingest::IngestUseCase;
use crate::application::retrieve::RetrieveUseCase;
use crate::application::stats::StatsUseCase;
use crate::config::{Settings, DB_FILE_NAME};
use crate::domain::entities::collection::CollectionInfo;
use crate::domain::entities::record::{EmbeddedArticle, Record};
use crate::domain::entities::retrieval::RetrievalResult;
use crate::domain::error::DomainError;
use crate::domain::ports::collection_store::CollectionStore;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::infrastructure::sqlite::collection_store::SqliteCollectionStore;
use crate::infrastructure::sqlite::migrations::run_migrations;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Ingestion and retrieval over one shared handle to the collection store.
pub struct NewsRag {
    collection: String,
    ingest_uc: IngestUseCase,
    retrieve_uc: RetrieveUseCase,
    stats_uc: StatsUseCase,
}

impl NewsRag {
    pub fn new(settings: &Settings) -> Result<Self, DomainError> {
        Self::with_providers(
            &settings.db_dir,
            &settings.collection,
            settings.embedding.build_provider(),
        )
    }

    /// `db_dir` of `:memory:` opens a throwaway in-memory store.
    pub fn with_providers(
        db_dir: &str,
        collection: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        let conn = open_connection(db_dir)?;
        run_migrations(&conn)?;

        let store: Arc<dyn CollectionStore> = Arc::new(SqliteCollectionStore::new(conn));
        let info = store.get_or_create(collection)?;

        let provider_dim = embedder.dimension();
        if provider_dim > 0 {
            if let Some(stored_dim) = info.dimension {
                if stored_dim != provider_dim {
                    tracing::warn!(
                        collection,
                        stored_dim,
                        provider_dim,
                        "stored vectors and embedding provider disagree on dimension; queries will fail"
                    );
                }
            }
        }

        Ok(Self {
            collection: collection.to_string(),
            ingest_uc: IngestUseCase::new(store.clone(), collection.to_string()),
            retrieve_uc: RetrieveUseCase::new(store.clone(), embedder, collection.to_string()),
            stats_uc: StatsUseCase::new(store, collection.to_string()),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn ingest(&self, items: Vec<EmbeddedArticle>) -> Result<usize, DomainError> {
        self.ingest_uc.execute(items)
    }

    pub fn ingest_file(&self, path: &Path) -> Result<usize, DomainError> {
        self.ingest_uc.execute_file(path)
    }

    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalResult, DomainError> {
        self.retrieve_uc.execute(query, top_k).await
    }

    pub fn stats(&self) -> Result<CollectionInfo, DomainError> {
        self.stats_uc.stats()
    }

    pub fn record(&self, id: &str) -> Result<Option<Record>, DomainError> {
        self.stats_uc.record(id)
    }
}

fn open_connection(db_dir: &str) -> Result<Connection, DomainError> {
    if db_dir == ":memory:" {
        return Connection::open_in_memory().map_err(|e| DomainError::Database(format!("DB error: {e}")));
    }

    std::fs::create_dir_all(db_dir).map_err(|e| DomainError::Io(format!("{db_dir}: {e}")))?;
    let path = Path::new(db_dir).join(DB_FILE_NAME);
    let conn = Connection::open(&path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
    Ok(conn)
}
