//! Ingestion pipeline: list, fetch transcripts, clean, embed, persist.
//!
//! Every run is a full refresh of the stored table. A video without a
//! transcript is kept with its title only and never aborts the batch.

use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, YtSearchError};
use crate::store::{EmbeddingSignature, SqliteVideoStore, VideoRecord, VideoTable};
use crate::transform::{prepare_rows, CleanVideo, RawVideo};
use crate::youtube::{CaptionFetcher, DataApiClient, TranscriptFetcher, VideoLister};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records written to the store.
    pub videos: usize,
    /// Videos with a non-empty transcript.
    pub transcripts_found: usize,
    /// Videos stored without a transcript.
    pub transcripts_missing: usize,
}

/// Coordinates the collaborators of an ingestion run.
pub struct IngestPipeline {
    lister: Arc<dyn VideoLister>,
    transcripts: Arc<dyn TranscriptFetcher>,
    embedder: Arc<dyn Embedder>,
    store: Arc<SqliteVideoStore>,
}

impl IngestPipeline {
    /// Build the pipeline with the real YouTube and embedding clients.
    pub fn new(settings: &Settings) -> Result<Self> {
        let api_key = settings.youtube_api_key().ok_or_else(|| {
            YtSearchError::Config(
                "YouTube API key not set. Set youtube.api_key or the YT_API_KEY environment variable."
                    .to_string(),
            )
        })?;

        let lister = Arc::new(DataApiClient::new(api_key, settings.youtube.page_size)?);
        let transcripts = Arc::new(CaptionFetcher::new(
            settings.youtube.transcript_languages.clone(),
        )?);
        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let store = Arc::new(SqliteVideoStore::new(&settings.store_path())?);

        Ok(Self::with_components(lister, transcripts, embedder, store))
    }

    /// Build the pipeline with custom components.
    pub fn with_components(
        lister: Arc<dyn VideoLister>,
        transcripts: Arc<dyn TranscriptFetcher>,
        embedder: Arc<dyn Embedder>,
        store: Arc<SqliteVideoStore>,
    ) -> Self {
        Self {
            lister,
            transcripts,
            embedder,
            store,
        }
    }

    /// Run a full refresh for `channel_id`.
    #[instrument(skip(self))]
    pub async fn run(&self, channel_id: &str, limit: Option<usize>) -> Result<IngestReport> {
        let summaries = self.lister.list_channel_videos(channel_id, limit).await?;
        if summaries.is_empty() {
            warn!("Channel {} listed no videos; the stored table will be emptied", channel_id);
        }

        let mut raw = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let transcript = match self.transcripts.fetch_transcript(&summary.video_id).await {
                Ok(Some(text)) => Some(text),
                Ok(None) => {
                    warn!("No transcript available for {}", summary.video_id);
                    None
                }
                Err(e) => {
                    warn!("Transcript fetch failed for {}: {}", summary.video_id, e);
                    None
                }
            };
            raw.push(RawVideo {
                summary,
                transcript,
            });
        }

        let videos = prepare_rows(raw);
        let table = self.embed_table(videos).await?;

        let report = IngestReport {
            videos: table.len(),
            transcripts_found: table.transcript_count(),
            transcripts_missing: table.len() - table.transcript_count(),
        };

        self.store.replace_all(&table)?;
        info!(
            "Ingested {} videos ({} with transcripts)",
            report.videos, report.transcripts_found
        );

        Ok(report)
    }

    /// Embed titles and present transcripts and assemble the table.
    async fn embed_table(&self, videos: Vec<CleanVideo>) -> Result<VideoTable> {
        let titles: Vec<String> = videos.iter().map(|v| v.title.clone()).collect();
        let title_embeddings = self.embedder.embed_batch(&titles).await?;

        let (transcript_rows, transcript_texts): (Vec<usize>, Vec<String>) = videos
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.transcript.clone().map(|t| (i, t)))
            .unzip();
        let transcript_embeddings = self.embedder.embed_batch(&transcript_texts).await?;

        if title_embeddings.len() != videos.len()
            || transcript_embeddings.len() != transcript_rows.len()
        {
            return Err(YtSearchError::Embedding(
                "Embedder returned a different number of vectors than inputs".to_string(),
            ));
        }

        let mut transcript_by_row: Vec<Option<Vec<f32>>> = vec![None; videos.len()];
        for (row, embedding) in transcript_rows.into_iter().zip(transcript_embeddings) {
            transcript_by_row[row] = Some(embedding);
        }

        let records = videos
            .into_iter()
            .zip(title_embeddings)
            .zip(transcript_by_row)
            .map(|((video, title_embedding), transcript_embedding)| VideoRecord {
                video_id: video.video_id,
                published_at: video.published_at,
                title: video.title,
                transcript: video.transcript,
                title_embedding: Some(title_embedding),
                transcript_embedding,
            })
            .collect();

        let signature = EmbeddingSignature::new(self.embedder.model(), self.embedder.dimensions());
        VideoTable::new(signature, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::StubEmbedder;
    use crate::youtube::VideoSummary;
    use async_trait::async_trait;

    struct FixedLister(Vec<VideoSummary>);

    #[async_trait]
    impl VideoLister for FixedLister {
        async fn list_channel_videos(&self, _channel_id: &str, limit: Option<usize>) -> Result<Vec<VideoSummary>> {
            let mut videos = self.0.clone();
            if let Some(limit) = limit {
                videos.truncate(limit);
            }
            Ok(videos)
        }
    }

    /// Transcripts for "a" only; "b" has none, "c" errors.
    struct PartialTranscripts;

    #[async_trait]
    impl TranscriptFetcher for PartialTranscripts {
        async fn fetch_transcript(&self, video_id: &str) -> Result<Option<String>> {
            match video_id {
                "a" => Ok(Some("hello &amp; welcome\nto the video".to_string())),
                "c" => Err(YtSearchError::Transcript("disabled".to_string())),
                _ => Ok(None),
            }
        }
    }

    fn summary(id: &str, title: &str) -> VideoSummary {
        VideoSummary {
            video_id: id.to_string(),
            published_at: "2024-05-01T10:00:00Z".to_string(),
            title: title.to_string(),
        }
    }

    fn pipeline(store: Arc<SqliteVideoStore>) -> IngestPipeline {
        let lister = FixedLister(vec![
            summary("a", "Alpha"),
            summary("b", "Beta"),
            summary("c", "Gamma"),
            summary("a", "Alpha repeat"),
        ]);
        let embedder = StubEmbedder::new(vec![0.0, 0.0])
            .with("Alpha", vec![1.0, 0.0])
            .with("hello & welcome to the video", vec![0.5, 0.5]);

        IngestPipeline::with_components(
            Arc::new(lister),
            Arc::new(PartialTranscripts),
            Arc::new(embedder),
            store,
        )
    }

    #[tokio::test]
    async fn test_missing_transcripts_do_not_abort() {
        let store = Arc::new(SqliteVideoStore::in_memory().unwrap());
        let report = pipeline(store.clone()).run("UCchannel", None).await.unwrap();

        assert_eq!(
            report,
            IngestReport {
                videos: 3,
                transcripts_found: 1,
                transcripts_missing: 2,
            }
        );

        let table = store.load().unwrap().unwrap();
        let ids: Vec<&str> = table.records().iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let a = table.get("a").unwrap();
        assert_eq!(a.transcript.as_deref(), Some("hello & welcome to the video"));
        assert_eq!(a.title_embedding.as_deref(), Some(&[1.0, 0.0][..]));
        assert_eq!(a.transcript_embedding.as_deref(), Some(&[0.5, 0.5][..]));

        let c = table.get("c").unwrap();
        assert!(c.transcript.is_none());
        assert!(c.transcript_embedding.is_none());
        assert!(c.title_embedding.is_some());

        assert_eq!(table.signature(), &EmbeddingSignature::new("stub", 2));
    }

    #[tokio::test]
    async fn test_rerun_replaces_table() {
        let store = Arc::new(SqliteVideoStore::in_memory().unwrap());
        let pipeline = pipeline(store.clone());

        pipeline.run("UCchannel", None).await.unwrap();
        let report = pipeline.run("UCchannel", Some(1)).await.unwrap();

        assert_eq!(report.videos, 1);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_before_write() {
        let store = Arc::new(SqliteVideoStore::in_memory().unwrap());
        let pipeline = IngestPipeline::with_components(
            Arc::new(FixedLister(vec![summary("a", "Alpha")])),
            Arc::new(PartialTranscripts),
            Arc::new(StubEmbedder::failing(2)),
            store.clone(),
        );

        assert!(pipeline.run("UCchannel", None).await.is_err());
        assert!(store.load().unwrap().is_none());
    }
}
