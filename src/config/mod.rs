//! Configuration module for ytsearch.
//!
//! Handles loading and saving application settings.

mod settings;

pub use settings::{
    EmbeddingSettings, GeneralSettings, ScoreMode, SearchSettings, ServerSettings, Settings,
    StoreSettings, YoutubeSettings,
};
