//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{ScoreMode, Settings};
use crate::search::SearchEngine;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    threshold: Option<f32>,
    limit: Option<usize>,
    score_mode: Option<ScoreMode>,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(threshold) = threshold {
        settings.search.threshold = threshold;
    }
    if let Some(limit) = limit {
        settings.search.top_k = limit;
    }
    if let Some(score_mode) = score_mode {
        settings.search.score_mode = score_mode;
    }

    let engine = SearchEngine::from_settings(&settings)?;
    let params = engine.params();
    Output::kv(
        "Scoring",
        &format!("{} distance < {}, top {}", params.score_mode, params.threshold, params.top_k),
    );

    let spinner = Output::spinner("Searching...");
    let results = engine.search_hits(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(hits) => {
            if hits.is_empty() {
                Output::warning("No videos found within the distance threshold.");
            } else {
                Output::success(&format!("Found {} results", hits.len()));

                for (i, hit) in hits.iter().enumerate() {
                    Output::search_result(
                        i + 1,
                        &hit.record.title,
                        hit.distance,
                        &hit.record.url(),
                        hit.record.transcript.as_deref(),
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
