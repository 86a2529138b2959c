//! YouTube Data API v3 client for listing channel videos.

use super::{VideoLister, VideoSummary};
use crate::error::{Result, YtSearchError};
use async_trait::async_trait;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, instrument};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEO_KIND: &str = "youtube#video";
const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    kind: String,
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    published_at: String,
    title: String,
}

/// Parse one page of the search endpoint into video summaries and the next page token.
fn parse_page(body: &str) -> Result<(Vec<VideoSummary>, Option<String>)> {
    let page: SearchListResponse = serde_json::from_str(body)?;

    let videos = page
        .items
        .into_iter()
        .filter(|item| item.id.kind == VIDEO_KIND)
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            let snippet = item.snippet?;
            Some(VideoSummary {
                video_id,
                published_at: snippet.published_at,
                title: snippet.title,
            })
        })
        .collect();

    Ok((videos, page.next_page_token))
}

/// Client for the Data API `search` endpoint.
pub struct DataApiClient {
    http: reqwest::Client,
    api_key: String,
    page_size: u32,
}

impl DataApiClient {
    pub fn new(api_key: impl Into<String>, page_size: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    async fn fetch_page(&self, channel_id: &str, page_token: Option<&str>) -> Result<String> {
        let page_size = self.page_size.to_string();
        let mut query = vec![
            ("key", self.api_key.as_str()),
            ("channelId", channel_id),
            ("part", "snippet,id"),
            ("order", "date"),
            ("type", "video"),
            ("maxResults", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.http.get(SEARCH_URL).query(&query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(YtSearchError::YoutubeApi(format!(
                "search request failed with {}: {}",
                status, body
            )));
        }

        Ok(body)
    }
}

/// Walk the result pages until the token runs out or `limit` videos are collected.
///
/// `fetch` gets the token of the page to request and returns the raw page body.
async fn collect_pages<F, Fut>(limit: Option<usize>, mut fetch: F) -> Result<Vec<VideoSummary>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut videos = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let body = fetch(page_token.take()).await?;
        let (page, next) = parse_page(&body)?;
        debug!("Fetched page with {} videos", page.len());
        videos.extend(page);

        if let Some(limit) = limit {
            if videos.len() >= limit {
                videos.truncate(limit);
                break;
            }
        }

        match next {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(videos)
}

#[async_trait]
impl VideoLister for DataApiClient {
    #[instrument(skip(self))]
    async fn list_channel_videos(&self, channel_id: &str, limit: Option<usize>) -> Result<Vec<VideoSummary>> {
        let videos = collect_pages(limit, |token| async move {
            self.fetch_page(channel_id, token.as_deref()).await
        })
        .await?;

        info!("Listed {} videos for channel {}", videos.len(), channel_id);
        Ok(videos)
    }
}
