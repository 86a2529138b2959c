//! Cleaning and type coercion for fetched video rows.

use crate::youtube::VideoSummary;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::warn;

/// A fetched video before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVideo {
    pub summary: VideoSummary,
    pub transcript: Option<String>,
}

/// A cleaned, typed video ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanVideo {
    pub video_id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub title: String,
    pub transcript: Option<String>,
}

const ENTITIES: &[(&str, &str)] = &[
    ("&#39;", "'"),
    ("&#039;", "'"),
    ("&apos;", "'"),
    ("&quot;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    // Last, so "&amp;lt;" decodes to "&lt;" and not "<".
    ("&amp;", "&"),
];

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Decode API entities, drop control characters and collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let mut decoded = text.to_string();
    for (entity, replacement) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }

    let visible: String = decoded
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    whitespace_regex().replace_all(&visible, " ").trim().to_string()
}

/// Parse an RFC 3339 timestamp as returned by the Data API.
pub fn parse_published_at(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value.trim()) {
        Ok(d) => Some(d.with_timezone(&Utc)),
        Err(e) => {
            warn!("Unparsable publish time '{}': {}", value, e);
            None
        }
    }
}

/// Clean and coerce fetched rows, dropping repeated video IDs (first wins).
pub fn prepare_rows(rows: Vec<RawVideo>) -> Vec<CleanVideo> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        if !seen.insert(row.summary.video_id.clone()) {
            warn!("Dropping duplicate video {}", row.summary.video_id);
            continue;
        }

        let transcript = row
            .transcript
            .as_deref()
            .map(clean_text)
            .filter(|t| !t.is_empty());

        out.push(CleanVideo {
            published_at: parse_published_at(&row.summary.published_at),
            title: clean_text(&row.summary.title),
            video_id: row.summary.video_id,
            transcript,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, title: &str, published_at: &str, transcript: Option<&str>) -> RawVideo {
        RawVideo {
            summary: VideoSummary {
                video_id: id.to_string(),
                published_at: published_at.to_string(),
                title: title.to_string(),
            },
            transcript: transcript.map(str::to_string),
        }
    }

    #[test]
    fn test_clean_text_entities() {
        assert_eq!(clean_text("Don&#39;t Panic &amp; Relax"), "Don't Panic & Relax");
        assert_eq!(clean_text("&quot;quoted&quot; &lt;b&gt;"), "\"quoted\" <b>");
        assert_eq!(clean_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_clean_text_whitespace_and_controls() {
        assert_eq!(clean_text("  hello\n\tworld\u{0}  "), "hello world");
        assert_eq!(clean_text("\n\n"), "");
    }

    #[test]
    fn test_parse_published_at() {
        let parsed = parse_published_at("2015-06-01T12:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2015-06-01T12:00:00+00:00");
        assert!(parse_published_at("yesterday").is_none());
    }

    #[test]
    fn test_prepare_rows() {
        let rows = vec![
            raw("a", "First &amp; best", "2024-01-02T03:04:05Z", Some("  so [Music]\nhello ")),
            raw("b", "Second", "not a date", Some("   ")),
            raw("a", "Duplicate", "2024-01-02T03:04:05Z", None),
            raw("c", "Third", "2023-12-31T00:00:00Z", None),
        ];

        let clean = prepare_rows(rows);
        assert_eq!(clean.len(), 3);
        assert_eq!(clean[0].title, "First & best");
        assert_eq!(clean[0].transcript.as_deref(), Some("so [Music] hello"));
        assert!(clean[0].published_at.is_some());
        assert!(clean[1].transcript.is_none());
        assert!(clean[1].published_at.is_none());
        assert_eq!(clean[2].video_id, "c");
    }
}
