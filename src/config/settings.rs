//! Configuration settings for ytsearch.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the YouTube Data API key.
pub const YT_API_KEY_ENV: &str = "YT_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub youtube: YoutubeSettings,
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
    pub store: StoreSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.ytsearch".to_string(),
        }
    }
}

/// YouTube-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// YouTube Data API key. Falls back to `YT_API_KEY` when unset.
    pub api_key: Option<String>,
    /// Results requested per page from the search endpoint (API max is 50).
    pub page_size: u32,
    /// Preferred transcript languages, in priority order.
    pub transcript_languages: Vec<String>,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            page_size: 50,
            transcript_languages: vec!["en".to_string()],
        }
    }
}

/// Embedding generation settings.
///
/// Any OpenAI-compatible `/v1/embeddings` endpoint works. The defaults point
/// at a local server hosting `all-MiniLM-L6-v2`, which is what the default
/// search threshold was tuned against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Base URL of the embeddings API. `None` uses api.openai.com.
    ///
    /// Blank text (an empty `/search?query=`) is sent as a single space,
    /// since OpenAI and most compatible servers reject empty input.
    pub api_base: Option<String>,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Send `dimensions` in the request (only models that support it).
    pub send_dimensions: bool,
    /// Maximum inputs per embedding request.
    pub batch_size: usize,
    /// Texts longer than this many characters are truncated before embedding.
    pub max_input_chars: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_base: Some("http://127.0.0.1:8080/v1".to_string()),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            send_dimensions: false,
            batch_size: 32,
            max_input_chars: 2000,
            timeout_secs: 60,
        }
    }
}

/// How per-field distances are combined into one record distance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// Best (minimum) distance over title and transcript.
    #[default]
    Min,
    /// Title distance plus transcript distance.
    Sum,
}

impl std::str::FromStr for ScoreMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "min" => Ok(ScoreMode::Min),
            "sum" => Ok(ScoreMode::Sum),
            _ => Err(format!("Unknown score mode: {}", s)),
        }
    }
}

impl std::fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreMode::Min => write!(f, "min"),
            ScoreMode::Sum => write!(f, "sum"),
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Records at or above this L1 distance are discarded.
    /// Tied to the embedding model; re-derive it when switching models.
    pub threshold: f32,
    /// Maximum number of results returned.
    pub top_k: usize,
    /// How title and transcript distances are combined.
    pub score_mode: ScoreMode,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            threshold: 40.0,
            top_k: 5,
            score_mode: ScoreMode::Min,
        }
    }
}

/// Video table storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the SQLite file holding the video table.
    pub path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: "~/.ytsearch/videos.db".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::YtSearchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ytsearch")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded video table path.
    pub fn store_path(&self) -> PathBuf {
        Self::expand_path(&self.store.path)
    }

    /// Resolve the YouTube API key from config or environment.
    pub fn youtube_api_key(&self) -> Option<String> {
        self.youtube
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(YT_API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.search.threshold, 40.0);
        assert_eq!(settings.search.top_k, 5);
        assert_eq!(settings.search.score_mode, ScoreMode::Min);
        assert_eq!(settings.embedding.dimensions, 384);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [search]
            threshold = 12.5
            score_mode = "sum"
            "#,
        )
        .unwrap();

        assert_eq!(settings.search.threshold, 12.5);
        assert_eq!(settings.search.score_mode, ScoreMode::Sum);
        assert_eq!(settings.search.top_k, 5);
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.search.top_k = 3;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.search.top_k, 3);
    }

    #[test]
    fn test_score_mode_parse() {
        assert_eq!("MIN".parse::<ScoreMode>().unwrap(), ScoreMode::Min);
        assert_eq!("sum".parse::<ScoreMode>().unwrap(), ScoreMode::Sum);
        assert!("max".parse::<ScoreMode>().is_err());
    }
}
