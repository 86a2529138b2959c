//! Doctor command - verify credentials, the stored table and the embedding endpoint.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::store::{EmbeddingSignature, SqliteVideoStore};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("ytsearch Doctor");
    println!();

    let mut checks = Vec::new();

    let sections: Vec<(&str, Vec<CheckResult>)> = vec![
        ("Credentials", vec![check_youtube_key(settings), check_openai_key(settings)]),
        ("Embedding Endpoint", vec![check_embedder(settings).await]),
        ("Video Table", check_table(settings)),
        ("Configuration", vec![check_config_file()]),
    ];

    for (title, results) in sections {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    }

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} error(s) found.", errors));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! ytsearch is ready to use.");
    }

    Ok(())
}

fn check_youtube_key(settings: &Settings) -> CheckResult {
    match settings.youtube_api_key() {
        Some(key) => CheckResult::ok("YouTube API key", &format!("configured ({})", mask(&key))),
        None => CheckResult::error(
            "YouTube API key",
            "not set",
            "Set youtube.api_key or export YT_API_KEY='...' (needed for ingest)",
        ),
    }
}

fn check_openai_key(settings: &Settings) -> CheckResult {
    let key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
    match (key, settings.embedding.api_base.is_some()) {
        (Some(key), _) => CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", mask(&key))),
        (None, true) => CheckResult::ok("OPENAI_API_KEY", "not set (custom endpoint)"),
        (None, false) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

async fn check_embedder(settings: &Settings) -> CheckResult {
    let endpoint = settings
        .embedding
        .api_base
        .clone()
        .unwrap_or_else(|| "api.openai.com".to_string());

    let embedder = match OpenAIEmbedder::from_settings(&settings.embedding) {
        Ok(e) => e,
        Err(e) => return CheckResult::error("Embedder", &e.to_string(), "Check [embedding] settings"),
    };

    match embedder.embed("health check").await {
        Ok(v) => CheckResult::ok(
            "Embedder",
            &format!("{} at {} ({} dims)", embedder.model(), endpoint, v.len()),
        ),
        Err(e) => CheckResult::error(
            "Embedder",
            &format!("{} unreachable: {}", endpoint, e),
            "Start the embedding server or fix embedding.api_base",
        ),
    }
}

fn check_table(settings: &Settings) -> Vec<CheckResult> {
    let path = settings.store_path();
    if !path.exists() {
        return vec![CheckResult::warning(
            "Video table",
            &format!("{} (not created yet)", path.display()),
            "Create it with: ytsearch ingest <channel>",
        )];
    }

    let size = std::fs::metadata(&path)
        .map(|m| format_size(m.len()))
        .unwrap_or_else(|_| "unknown size".to_string());
    let mut results = vec![CheckResult::ok(
        "Video table",
        &format!("{} ({})", path.display(), size),
    )];

    let store = match SqliteVideoStore::new(&path) {
        Ok(s) => s,
        Err(e) => {
            results.push(CheckResult::error("Table contents", &e.to_string(), "Re-run ingest"));
            return results;
        }
    };

    let configured = EmbeddingSignature::new(
        settings.embedding.model.clone(),
        settings.embedding.dimensions as usize,
    );
    let count = store.count().unwrap_or(0);

    results.push(match store.signature() {
        Ok(Some(sig)) if sig == configured => {
            CheckResult::ok("Table contents", &format!("{} videos, {}", count, sig))
        }
        Ok(Some(sig)) => CheckResult::error(
            "Table contents",
            &format!("embedded with {}, configured {}", sig, configured),
            "Re-run ingest after changing the embedding model",
        ),
        Ok(None) => CheckResult::warning(
            "Table contents",
            "empty",
            "Populate it with: ytsearch ingest <channel>",
        ),
        Err(e) => CheckResult::error("Table contents", &e.to_string(), "Re-run ingest"),
    });

    results
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: ytsearch config init",
        )
    }
}

/// Show only the edges of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("AIzaSyA-1234567890"), "AIza...7890");
    }

    #[test]
    fn test_check_table_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.store.path = dir.path().join("videos.db").to_string_lossy().to_string();

        let results = check_table(&settings);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, CheckStatus::Warning);
    }

    #[test]
    fn test_check_table_signature_mismatch() {
        use crate::store::test_support::record;
        use crate::store::VideoTable;

        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.store.path = dir.path().join("videos.db").to_string_lossy().to_string();

        let store = SqliteVideoStore::new(&settings.store_path()).unwrap();
        let table = VideoTable::new(
            EmbeddingSignature::new("some-other-model", 2),
            vec![record("a", "A", vec![0.0, 0.0], None)],
        )
        .unwrap();
        store.replace_all(&table).unwrap();
        drop(store);

        let results = check_table(&settings);
        assert_eq!(results[1].status, CheckStatus::Error);
    }
}
