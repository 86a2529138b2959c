//! Nearest-neighbor search over the video table.
//!
//! Scoring is a linear scan: every record's title (and transcript, when
//! present) embedding is compared to the query embedding by Manhattan
//! distance. Records at or above the threshold are dropped, the rest are
//! ranked ascending and truncated to `top_k`.

use crate::config::{ScoreMode, SearchSettings, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, YtSearchError};
use crate::store::{EmbeddingSignature, SqliteVideoStore, VideoRecord, VideoTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Parameters controlling filtering and ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Records whose distance is `>= threshold` are discarded.
    pub threshold: f32,
    /// Maximum number of hits returned.
    pub top_k: usize,
    /// How title and transcript distances are combined.
    pub score_mode: ScoreMode,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams::from(&SearchSettings::default())
    }
}

impl From<&SearchSettings> for SearchParams {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            threshold: settings.threshold,
            top_k: settings.top_k,
            score_mode: settings.score_mode,
        }
    }
}

/// A scored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<'a> {
    pub record: &'a VideoRecord,
    /// Combined L1 distance to the query (lower is closer).
    pub distance: f32,
}

/// Search response: parallel title and video ID lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub title: Vec<String>,
    pub video_id: Vec<String>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.video_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.video_id.is_empty()
    }
}

impl<'a> FromIterator<Hit<'a>> for SearchResults {
    fn from_iter<I: IntoIterator<Item = Hit<'a>>>(iter: I) -> Self {
        let (title, video_id) = iter
            .into_iter()
            .map(|hit| (hit.record.title.clone(), hit.record.video_id.clone()))
            .unzip();
        Self { title, video_id }
    }
}

/// Manhattan (L1) distance. `None` when the vectors differ in length.
pub fn manhattan_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    Some(a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum())
}

/// Distance of one record to the query, or `None` if it has nothing to score.
fn record_distance(query: &[f32], record: &VideoRecord, mode: ScoreMode) -> Option<f32> {
    let title = record
        .title_embedding
        .as_deref()
        .and_then(|e| manhattan_distance(query, e));
    let transcript = record
        .transcript_embedding
        .as_deref()
        .and_then(|e| manhattan_distance(query, e));

    match (title, transcript, mode) {
        (Some(t), Some(s), ScoreMode::Min) => Some(t.min(s)),
        (Some(t), Some(s), ScoreMode::Sum) => Some(t + s),
        (Some(d), None, _) | (None, Some(d), _) => Some(d),
        (None, None, _) => None,
    }
}

/// Score, filter, rank and truncate. Pure function of its inputs.
///
/// Ties keep table order.
pub fn rank<'a>(query: &[f32], table: &'a VideoTable, params: &SearchParams) -> Vec<Hit<'a>> {
    let mut hits: Vec<Hit<'a>> = table
        .records()
        .iter()
        .filter_map(|record| {
            record_distance(query, record, params.score_mode)
                .map(|distance| Hit { record, distance })
        })
        .filter(|hit| hit.distance < params.threshold)
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits.truncate(params.top_k);
    hits
}

/// Load the stored table for querying with `embedder`.
///
/// A table built by a different model or dimension is rejected. A store that
/// was never written yields an empty table.
pub fn load_table(store: &SqliteVideoStore, embedder: &dyn Embedder) -> Result<VideoTable> {
    let expected = EmbeddingSignature::new(embedder.model(), embedder.dimensions());

    match store.load()? {
        Some(table) if table.signature() != &expected => Err(YtSearchError::Config(format!(
            "Video table was embedded with {}, but the configured embedder is {}. Re-run ingest.",
            table.signature(),
            expected
        ))),
        Some(table) => Ok(table),
        None => {
            warn!("No video table ingested yet; serving an empty table");
            Ok(VideoTable::empty(expected))
        }
    }
}

/// Embeds queries and ranks them against an immutable table.
pub struct SearchEngine {
    table: Arc<VideoTable>,
    embedder: Arc<dyn Embedder>,
    params: SearchParams,
}

impl SearchEngine {
    pub fn new(table: Arc<VideoTable>, embedder: Arc<dyn Embedder>, params: SearchParams) -> Self {
        Self {
            table,
            embedder,
            params,
        }
    }

    /// Build the engine from settings: configured embedder plus the stored table.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = OpenAIEmbedder::from_settings(&settings.embedding)?;
        let store = SqliteVideoStore::new(&settings.store_path())?;
        let table = load_table(&store, &embedder)?;
        info!("Search engine ready over {} videos", table.len());

        Ok(Self::new(
            Arc::new(table),
            Arc::new(embedder),
            SearchParams::from(&settings.search),
        ))
    }

    pub fn table(&self) -> &VideoTable {
        &self.table
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Embed the query and return ranked hits with distances.
    #[instrument(skip(self), fields(rows = self.table.len()))]
    pub async fn search_hits(&self, query: &str) -> Result<Vec<Hit<'_>>> {
        if self.table.is_empty() {
            debug!("Video table is empty, skipping query embedding");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let expected = self.table.signature().dimensions;
        if query_embedding.len() != expected {
            return Err(YtSearchError::DimensionMismatch {
                expected,
                actual: query_embedding.len(),
            });
        }

        let hits = rank(&query_embedding, &self.table, &self.params);
        debug!("{} hits under threshold {}", hits.len(), self.params.threshold);
        Ok(hits)
    }

    /// Embed the query and return the parallel title / video ID lists.
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        Ok(self.search_hits(query).await?.into_iter().collect())
    }
}
