//! YouTube collaborators: channel video listing and transcript fetching.
//!
//! Both sit behind traits so ingestion can be exercised without the network.

mod data_api;
mod transcript;

pub use data_api::DataApiClient;
pub use transcript::CaptionFetcher;

use crate::error::{Result, YtSearchError};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

/// A video as listed by the platform, before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_id: String,
    /// Publish time as returned by the API (RFC 3339).
    pub published_at: String,
    pub title: String,
}

/// Lists the videos of a channel.
#[async_trait]
pub trait VideoLister: Send + Sync {
    /// List up to `limit` videos of a channel, newest first.
    async fn list_channel_videos(&self, channel_id: &str, limit: Option<usize>) -> Result<Vec<VideoSummary>>;
}

/// Fetches the transcript of a single video.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// `Ok(None)` when the platform has no transcript for the video.
    async fn fetch_transcript(&self, video_id: &str) -> Result<Option<String>>;
}

fn channel_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^UC[a-zA-Z0-9_-]{22}$").expect("valid regex"))
}

/// Extract a channel ID from a bare ID or a `youtube.com/channel/<id>` URL.
pub fn parse_channel_id(input: &str) -> Option<String> {
    let input = input.trim();
    if channel_id_regex().is_match(input) {
        return Some(input.to_string());
    }

    let with_scheme = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    let url = Url::parse(&with_scheme).ok()?;

    match url.host_str() {
        Some("youtube.com") | Some("www.youtube.com") | Some("m.youtube.com") => {}
        _ => return None,
    }

    let mut segments = url.path_segments()?;
    match (segments.next(), segments.next()) {
        (Some("channel"), Some(id)) if channel_id_regex().is_match(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Like [`parse_channel_id`], but rejects unrecognised input with an error.
pub fn resolve_channel_id(input: &str) -> Result<String> {
    parse_channel_id(input).ok_or_else(|| {
        YtSearchError::InvalidInput(format!(
            "'{}' is not a channel ID (UC...) or youtube.com/channel/<id> URL",
            input.trim()
        ))
    })
}
