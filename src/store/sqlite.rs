//! SQLite-backed video table store.
//!
//! The whole table lives in one file. Every ingestion replaces its contents in
//! a single transaction; readers load it once into a [`VideoTable`].

use super::{EmbeddingSignature, VideoRecord, VideoTable};
use crate::error::{Result, YtSearchError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS videos (
        position INTEGER PRIMARY KEY,
        video_id TEXT NOT NULL UNIQUE,
        published_at TEXT,
        title TEXT NOT NULL,
        transcript TEXT,
        title_embedding BLOB,
        transcript_embedding BLOB
    );

    CREATE TABLE IF NOT EXISTS table_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

/// SQLite-based store for the video table.
pub struct SqliteVideoStore {
    conn: Mutex<Connection>,
}

impl SqliteVideoStore {
    /// Open (or create) a store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened video table store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| YtSearchError::Table(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    /// Replace the stored table with `table`. Returns the number of rows written.
    #[instrument(skip(self, table), fields(rows = table.len()))]
    pub fn replace_all(&self, table: &VideoTable) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM videos", [])?;
        tx.execute("DELETE FROM table_meta", [])?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO videos
                (position, video_id, published_at, title, transcript,
                 title_embedding, transcript_embedding)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;

            for (position, record) in table.records().iter().enumerate() {
                stmt.execute(params![
                    position as i64,
                    record.video_id,
                    record.published_at.map(|d| d.to_rfc3339()),
                    record.title,
                    record.transcript,
                    record.title_embedding.as_deref().map(Self::embedding_to_bytes),
                    record
                        .transcript_embedding
                        .as_deref()
                        .map(Self::embedding_to_bytes),
                ])?;
            }

            let mut meta = tx.prepare("INSERT INTO table_meta (key, value) VALUES (?1, ?2)")?;
            meta.execute(params!["model", table.signature().model])?;
            meta.execute(params!["dimensions", table.signature().dimensions.to_string()])?;
            meta.execute(params!["ingested_at", Utc::now().to_rfc3339()])?;
        }

        tx.commit()?;

        debug!("Wrote {} video records", table.len());
        Ok(table.len())
    }

    fn meta_value(conn: &Connection, key: &str) -> Result<Option<String>> {
        Ok(conn
            .query_row(
                "SELECT value FROM table_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn read_signature(conn: &Connection) -> Result<Option<EmbeddingSignature>> {
        let model = Self::meta_value(conn, "model")?;
        let dimensions = Self::meta_value(conn, "dimensions")?;

        match (model, dimensions) {
            (Some(model), Some(dimensions)) => {
                let dimensions = dimensions.parse().map_err(|e| {
                    YtSearchError::Table(format!("Invalid stored dimensions '{}': {}", dimensions, e))
                })?;
                Ok(Some(EmbeddingSignature { model, dimensions }))
            }
            _ => Ok(None),
        }
    }

    /// Embedding signature of the stored table, `None` if nothing was ingested yet.
    pub fn signature(&self) -> Result<Option<EmbeddingSignature>> {
        let conn = self.lock()?;
        Self::read_signature(&conn)
    }

    /// When the stored table was last written.
    pub fn ingested_at(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;
        Ok(Self::meta_value(&conn, "ingested_at")?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc)))
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Load the stored table in table order. `None` if nothing was ingested yet.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<Option<VideoTable>> {
        let conn = self.lock()?;

        let Some(signature) = Self::read_signature(&conn)? else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT video_id, published_at, title, transcript,
                   title_embedding, transcript_embedding
            FROM videos
            ORDER BY position
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                let published_at: Option<String> = row.get(1)?;
                let title_embedding: Option<Vec<u8>> = row.get(4)?;
                let transcript_embedding: Option<Vec<u8>> = row.get(5)?;

                Ok(VideoRecord {
                    video_id: row.get(0)?,
                    published_at: published_at
                        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                        .map(|d| d.with_timezone(&Utc)),
                    title: row.get(2)?,
                    transcript: row.get(3)?,
                    title_embedding: title_embedding.as_deref().map(Self::bytes_to_embedding),
                    transcript_embedding: transcript_embedding
                        .as_deref()
                        .map(Self::bytes_to_embedding),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        info!("Loaded {} video records ({})", records.len(), signature);

        VideoTable::new(signature, records).map(Some)
    }
}
