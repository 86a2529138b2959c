//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::IngestPipeline;
use crate::youtube::resolve_channel_id;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(channel: &str, limit: Option<usize>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ytsearch doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let channel_id = match resolve_channel_id(channel) {
        Ok(id) => id,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    Output::info(&format!("Ingesting channel {}", channel_id));

    let pipeline = IngestPipeline::new(&settings)?;

    let spinner = Output::spinner("Fetching videos, transcripts and embeddings...");
    let result = pipeline.run(&channel_id, limit).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::success(&format!(
                "Indexed {} videos into {}",
                report.videos,
                settings.store_path().display()
            ));
            Output::kv("With transcript", &report.transcripts_found.to_string());
            Output::kv("Without transcript", &report.transcripts_missing.to_string());
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
