//! The video table: records, the in-memory table, and its on-disk store.
//!
//! Ingestion builds a [`VideoTable`] and overwrites the store with it. Query
//! serving loads the table once and treats it as immutable.

mod sqlite;

pub use sqlite::SqliteVideoStore;

use crate::error::{Result, YtSearchError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One video with its text fields and embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video ID, unique within a table.
    pub video_id: String,
    /// When the video was published.
    pub published_at: Option<DateTime<Utc>>,
    /// Cleaned title.
    pub title: String,
    /// Cleaned transcript, absent when none was available.
    pub transcript: Option<String>,
    /// Embedding of the title.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title_embedding: Option<Vec<f32>>,
    /// Embedding of the transcript.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transcript_embedding: Option<Vec<f32>>,
}

impl VideoRecord {
    /// Watch URL for this video.
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// Copy of this record without embeddings, for export.
    pub fn without_embeddings(&self) -> Self {
        Self {
            title_embedding: None,
            transcript_embedding: None,
            ..self.clone()
        }
    }
}

/// Model identity and vector size shared by every embedding in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSignature {
    pub model: String,
    pub dimensions: usize,
}

impl EmbeddingSignature {
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions,
        }
    }
}

impl std::fmt::Display for EmbeddingSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} dims)", self.model, self.dimensions)
    }
}

/// An ordered, validated set of video records.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoTable {
    signature: EmbeddingSignature,
    records: Vec<VideoRecord>,
}

impl VideoTable {
    /// Build a table, checking ID uniqueness and embedding dimensions.
    pub fn new(signature: EmbeddingSignature, records: Vec<VideoRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());

        for record in &records {
            if !seen.insert(record.video_id.as_str()) {
                return Err(YtSearchError::Table(format!(
                    "Duplicate video_id: {}",
                    record.video_id
                )));
            }

            for embedding in [&record.title_embedding, &record.transcript_embedding]
                .into_iter()
                .flatten()
            {
                if embedding.len() != signature.dimensions {
                    return Err(YtSearchError::Table(format!(
                        "Video {} has a {}-dimensional embedding, table expects {}",
                        record.video_id,
                        embedding.len(),
                        signature.dimensions
                    )));
                }
            }
        }

        Ok(Self { signature, records })
    }

    /// An empty table for the given signature.
    pub fn empty(signature: EmbeddingSignature) -> Self {
        Self {
            signature,
            records: Vec::new(),
        }
    }

    pub fn signature(&self) -> &EmbeddingSignature {
        &self.signature
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by video ID.
    pub fn get(&self, video_id: &str) -> Option<&VideoRecord> {
        self.records.iter().find(|r| r.video_id == video_id)
    }

    /// Number of records that have a transcript.
    pub fn transcript_count(&self) -> usize {
        self.records.iter().filter(|r| r.transcript.is_some()).count()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Record with a title embedding and optional transcript embedding.
    pub fn record(id: &str, title: &str, title_emb: Vec<f32>, transcript_emb: Option<Vec<f32>>) -> VideoRecord {
        VideoRecord {
            video_id: id.to_string(),
            published_at: None,
            title: title.to_string(),
            transcript: transcript_emb.as_ref().map(|_| format!("transcript of {}", title)),
            title_embedding: Some(title_emb),
            transcript_embedding: transcript_emb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::record;
    use super::*;

    #[test]
    fn test_table_rejects_duplicate_ids() {
        let sig = EmbeddingSignature::new("m", 2);
        let err = VideoTable::new(
            sig,
            vec![
                record("a", "A", vec![0.0, 0.0], None),
                record("a", "A again", vec![1.0, 1.0], None),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, YtSearchError::Table(_)));
    }

    #[test]
    fn test_table_rejects_wrong_dimensions() {
        let sig = EmbeddingSignature::new("m", 2);
        let result = VideoTable::new(
            sig,
            vec![record("a", "A", vec![0.0, 0.0], Some(vec![1.0, 2.0, 3.0]))],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_table_accessors() {
        let sig = EmbeddingSignature::new("m", 2);
        let table = VideoTable::new(
            sig.clone(),
            vec![
                record("a", "A", vec![0.0, 0.0], Some(vec![1.0, 1.0])),
                record("b", "B", vec![1.0, 0.0], None),
            ],
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.transcript_count(), 1);
        assert_eq!(table.get("b").map(|r| r.title.as_str()), Some("B"));
        assert_eq!(table.signature(), &sig);
        assert!(VideoTable::empty(sig).is_empty());
    }

    #[test]
    fn test_record_export_copy() {
        let r = record("_UVHneBUBW0", "PCA", vec![0.5], Some(vec![0.5]));
        let bare = r.without_embeddings();
        assert!(bare.title_embedding.is_none());
        assert_eq!(bare.transcript, r.transcript);
        assert_eq!(r.url(), "https://www.youtube.com/watch?v=_UVHneBUBW0");
    }
}
