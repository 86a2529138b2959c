//! ytsearch - semantic search over a YouTube channel
//!
//! Pulls a channel's video titles and transcripts, embeds them with a
//! sentence-embedding model, and answers free-text queries by Manhattan
//! distance between the query embedding and every stored embedding.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `youtube` - Channel listing and transcript fetching
//! - `transform` - Text cleaning and type coercion
//! - `embedding` - Embedding generation
//! - `store` - The video table and its SQLite file
//! - `pipeline` - Ingestion (full refresh of the table)
//! - `search` - Nearest-neighbor search over the loaded table
//! - `cli` - Command-line interface and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use ytsearch::config::Settings;
//! use ytsearch::search::SearchEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine = SearchEngine::from_settings(&settings)?;
//!
//!     let results = engine.search("pca").await?;
//!     for (title, id) in results.title.iter().zip(&results.video_id) {
//!         println!("{} https://youtu.be/{}", title, id);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod search;
pub mod store;
pub mod transform;
pub mod youtube;

pub use error::{Result, YtSearchError};
