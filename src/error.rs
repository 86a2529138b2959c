//! Error types for ytsearch.

use thiserror::Error;

/// Library-level error type for ytsearch operations.
#[derive(Error, Debug)]
pub enum YtSearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YouTube API error: {0}")]
    YoutubeApi(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Video table error: {0}")]
    Table(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for ytsearch operations.
pub type Result<T> = std::result::Result<T, YtSearchError>;
