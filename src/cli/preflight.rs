//! Pre-flight checks before expensive operations.
//!
//! Validates that credentials and the stored table are available before
//! starting work that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, YtSearchError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion needs a YouTube API key.
    Ingest,
    /// Searching and serving need an ingested table.
    Search,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest => check_youtube_key(settings),
        Operation::Search => check_table(settings),
    }
}

fn check_youtube_key(settings: &Settings) -> Result<()> {
    match settings.youtube_api_key() {
        Some(_) => Ok(()),
        None => Err(YtSearchError::Config(
            "YouTube API key not set. Set it with: export YT_API_KEY='...'".to_string(),
        )),
    }
}

fn check_table(settings: &Settings) -> Result<()> {
    let path = settings.store_path();
    if path.exists() {
        Ok(())
    } else {
        Err(YtSearchError::Config(format!(
            "No video table at {}. Run 'ytsearch ingest <channel>' first.",
            path.display()
        )))
    }
}
