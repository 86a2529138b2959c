//! Transcript fetching via the public caption endpoints.

use super::TranscriptFetcher;
use crate::error::{Result, YtSearchError};
use async_trait::async_trait;
use tracing::{debug, instrument};
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// Fetches caption tracks and flattens them to plain text.
pub struct CaptionFetcher {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
}

impl CaptionFetcher {
    pub fn new(languages: Vec<String>) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            YtSearchError::Transcript(format!("Failed to set up transcript API: {}", e))
        })?;

        let languages = if languages.is_empty() {
            vec!["en".to_string()]
        } else {
            languages
        };

        Ok(Self { api, languages })
    }
}

#[async_trait]
impl TranscriptFetcher for CaptionFetcher {
    /// Any failure to retrieve captions counts as "no transcript".
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, video_id: &str) -> Result<Option<String>> {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        match self.api.fetch_transcript(video_id, &languages, false).await {
            Ok(transcript) => {
                let text = transcript
                    .snippets
                    .iter()
                    .map(|snippet| snippet.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");

                if text.trim().is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(text))
                }
            }
            Err(e) => {
                debug!("No transcript for {}: {}", video_id, e);
                Ok(None)
            }
        }
    }
}
