use crate::domain::entities::collection::CollectionInfo;
use crate::domain::entities::record::{Metadata, Record};
use crate::domain::error::DomainError;
use crate::domain::ports::collection_store::{CollectionStore, ScoredRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::sync::Mutex;

/// Brute-force cosine store over a single SQLite connection.
///
/// Records keep their original rowid on overwrite, so ties in similarity are
/// broken by first-insertion order.
pub struct SqliteCollectionStore {
    conn: Mutex<Connection>,
}

impl SqliteCollectionStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DomainError> {
        self.conn.lock().map_err(|e| DomainError::Database(e.to_string()))
    }

    pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let mut dot = 0.0_f64;
        let mut norm_a = 0.0_f64;
        let mut norm_b = 0.0_f64;
        for (x, y) in a.iter().zip(b.iter()) {
            let x = *x as f64;
            let y = *y as f64;
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }
        let denom = norm_a.sqrt() * norm_b.sqrt();
        if denom == 0.0 { 0.0 } else { dot / denom }
    }

    pub(crate) fn serialize_vector(v: &[f32]) -> Vec<u8> {
        v.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    pub(crate) fn deserialize_vector(bytes: &[u8]) -> Vec<f32> {
        bytes.chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn load_info(conn: &Connection, name: &str) -> Result<Option<CollectionInfo>, DomainError> {
        let row: Option<(Option<i64>, String)> = conn
            .query_row(
                "SELECT dimension, created_at FROM collections WHERE name = ?1",
                params![name],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()
            .map_err(|e| DomainError::Database(format!("Failed to load collection {name}: {e}")))?;

        let Some((dimension, created_str)) = row else {
            return Ok(None);
        };

        let dimension = dimension
            .map(|d| {
                usize::try_from(d).map_err(|_| {
                    DomainError::Database(format!("Collection {name} has invalid dimension {d}"))
                })
            })
            .transpose()?;
        let created_at = DateTime::parse_from_rfc3339(&created_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                DomainError::Database(format!("Collection {name} has invalid created_at '{created_str}': {e}"))
            })?;

        Ok(Some(CollectionInfo {
            name: name.to_string(),
            dimension,
            count: Self::count_records(conn, name)?,
            created_at,
        }))
    }

    fn count_records(conn: &Connection, name: &str) -> Result<usize, DomainError> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM records WHERE collection = ?1",
                params![name],
                |r| r.get(0),
            )
            .map_err(|e| DomainError::Database(format!("Failed to count records: {e}")))?;
        usize::try_from(count).map_err(|_| DomainError::Database(format!("Invalid record count {count}")))
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<Record, rusqlite::Error> {
        let blob: Vec<u8> = row.get(1)?;
        let metadata_str: String = row.get(3)?;
        Ok(Record {
            id: row.get(0)?,
            embedding: Self::deserialize_vector(&blob),
            content: row.get(2)?,
            metadata: serde_json::from_str::<Metadata>(&metadata_str).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "unreadable record metadata, returning empty");
                Metadata::default()
            }),
        })
    }

    /// Checks a batch against itself and against the collection's recorded
    /// dimension. Returns the batch dimension.
    fn validate_batch(records: &[Record], stored_dim: Option<usize>) -> Result<usize, DomainError> {
        let dim = records[0].dimension();
        if dim == 0 {
            return Err(DomainError::InvalidInput(format!(
                "Record {} has an empty embedding",
                records[0].id
            )));
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            if record.dimension() != dim {
                return Err(DomainError::InvalidInput(format!(
                    "Record {} has embedding dimension {} but the batch uses {}",
                    record.id,
                    record.dimension(),
                    dim
                )));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(DomainError::InvalidInput(format!(
                    "Duplicate id in batch: {}",
                    record.id
                )));
            }
        }

        if let Some(stored) = stored_dim {
            if stored != dim {
                return Err(DomainError::InvalidInput(format!(
                    "Embedding dimension {dim} does not match collection dimension {stored}"
                )));
            }
        }
        Ok(dim)
    }
}

impl CollectionStore for SqliteCollectionStore {
    fn get_or_create(&self, name: &str) -> Result<CollectionInfo, DomainError> {
        let conn = self.lock()?;
        let created = conn
            .execute(
                "INSERT OR IGNORE INTO collections (name, dimension, created_at) VALUES (?1, NULL, ?2)",
                params![name, Utc::now().to_rfc3339()],
            )
            .map_err(|e| DomainError::Database(format!("Failed to create collection {name}: {e}")))?;
        if created > 0 {
            tracing::info!(collection = name, "created collection");
        }
        Self::load_info(&conn, name)?
            .ok_or_else(|| DomainError::NotFound(format!("collection {name}")))
    }

    fn info(&self, name: &str) -> Result<Option<CollectionInfo>, DomainError> {
        let conn = self.lock()?;
        Self::load_info(&conn, name)
    }

    fn upsert(&self, collection: &str, records: &[Record]) -> Result<usize, DomainError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let stored_dim: Option<i64> = tx
            .query_row(
                "SELECT dimension FROM collections WHERE name = ?1",
                params![collection],
                |r| r.get(0),
            )
            .optional()?
            .ok_or_else(|| DomainError::NotFound(format!("collection {collection}")))?;

        let stored_dim = stored_dim
            .map(|d| {
                usize::try_from(d).map_err(|_| {
                    DomainError::Database(format!("Collection {collection} has invalid dimension {d}"))
                })
            })
            .transpose()?;
        let dim = Self::validate_batch(records, stored_dim)?;
        if stored_dim.is_none() {
            tx.execute(
                "UPDATE collections SET dimension = ?1 WHERE name = ?2",
                params![dim as i64, collection],
            )?;
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (collection, id, embedding, document, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(collection, id) DO UPDATE SET
                    embedding = excluded.embedding,
                    document = excluded.document,
                    metadata = excluded.metadata",
            )?;
            for record in records {
                let metadata = serde_json::to_string(&record.metadata)
                    .map_err(|e| DomainError::Parse(format!("Failed to encode metadata: {e}")))?;
                stmt.execute(params![
                    collection,
                    record.id,
                    Self::serialize_vector(&record.embedding),
                    record.content,
                    metadata,
                ])
                .map_err(|e| DomainError::Database(format!("Failed to upsert record {}: {e}", record.id)))?;
            }
        }

        tx.commit()
            .map_err(|e| DomainError::Database(format!("Failed to commit batch: {e}")))?;
        Ok(records.len())
    }

    fn query(&self, collection: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredRecord>, DomainError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, embedding, document, metadata FROM records WHERE collection = ?1 ORDER BY rowid",
        )?;
        let records = stmt
            .query_map(params![collection], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Database(format!("Failed to read records of {collection}: {e}")))?;
        let mut results: Vec<ScoredRecord> = records
            .into_iter()
            .map(|record| {
                let score = Self::cosine_similarity(vector, &record.embedding);
                ScoredRecord { record, score }
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);
        Ok(results)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, DomainError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, embedding, document, metadata FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            Self::row_to_record,
        )
        .optional()
        .map_err(|e| DomainError::Database(format!("Failed to load record {id}: {e}")))
    }

    fn count(&self, collection: &str) -> Result<usize, DomainError> {
        let conn = self.lock()?;
        Self::count_records(&conn, collection)
    }
}
