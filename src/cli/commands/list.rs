//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::SqliteVideoStore;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: Settings) -> Result<()> {
    let store = SqliteVideoStore::new(&settings.store_path())?;

    match store.load() {
        Ok(Some(table)) if !table.is_empty() => {
            Output::header(&format!("Indexed Videos ({})", table.len()));
            println!();

            for record in table.records() {
                let published = record.published_at.map(|d| d.format("%Y-%m-%d").to_string());
                Output::video_info(
                    &record.title,
                    &record.video_id,
                    published.as_deref(),
                    record.transcript.is_some(),
                );
            }

            println!();
            Output::kv("Total videos", &table.len().to_string());
            Output::kv("With transcript", &table.transcript_count().to_string());
            Output::kv("Embeddings", &table.signature().to_string());
            if let Some(at) = store.ingested_at()? {
                Output::kv("Ingested at", &at.to_rfc3339());
            }
        }
        Ok(_) => {
            Output::info("No videos indexed yet. Use 'ytsearch ingest <channel>' to add content.");
        }
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
