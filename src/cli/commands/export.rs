//! Export command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::{SqliteVideoStore, VideoRecord};
use anyhow::Result;

/// Run the export command.
pub fn run_export(output: Option<String>, settings: Settings) -> Result<()> {
    let store = SqliteVideoStore::new(&settings.store_path())?;

    let records: Vec<VideoRecord> = match store.load()? {
        Some(table) => table.records().iter().map(VideoRecord::without_embeddings).collect(),
        None => {
            Output::warning("No videos indexed yet; exporting an empty list.");
            Vec::new()
        }
    };

    let json = serde_json::to_string_pretty(&records)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            Output::success(&format!("Exported {} videos to {}", records.len(), path));
        }
        None => println!("{}", json),
    }

    Ok(())
}
