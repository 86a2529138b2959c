//! CLI module for ytsearch.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::ScoreMode;
use clap::{Parser, Subcommand};

/// ytsearch - semantic search over a YouTube channel
///
/// Ingests a channel's titles and transcripts into an embedding table and
/// serves nearest-neighbor search over it.
#[derive(Parser, Debug)]
#[command(name = "ytsearch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a channel's videos and transcripts, embed them, and replace the table
    Ingest {
        /// Channel ID (UC...) or youtube.com/channel/<id> URL
        channel: String,

        /// Maximum number of videos to ingest (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search the video table from the terminal
    Search {
        /// Search query
        query: String,

        /// Override the distance threshold
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Override the maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Override how title and transcript distances combine (min or sum)
        #[arg(short, long)]
        score_mode: Option<ScoreMode>,
    },

    /// Start the HTTP search API
    Serve {
        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List videos in the table
    List,

    /// Export the table (without embeddings) as JSON
    Export {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check configuration, credentials, the stored table and the embedding endpoint
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["ytsearch", "-vv", "search", "pca", "--limit", "3"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Search { query, threshold, limit, score_mode } => {
                assert_eq!(query, "pca");
                assert_eq!(threshold, None);
                assert_eq!(limit, Some(3));
                assert_eq!(score_mode, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_score_mode() {
        let cli = Cli::parse_from(["ytsearch", "search", "pca", "--score-mode", "SUM", "-t", "55"]);
        assert!(matches!(
            cli.command,
            Commands::Search { score_mode: Some(ScoreMode::Sum), threshold: Some(t), .. } if t == 55.0
        ));

        assert!(Cli::try_parse_from(["ytsearch", "search", "pca", "--score-mode", "max"]).is_err());
    }

    #[test]
    fn test_parse_ingest() {
        let cli = Cli::parse_from(["ytsearch", "ingest", "UCa9gErQ9AE5jT2DZLjXBIdA", "-l", "10"]);
        assert!(matches!(cli.command, Commands::Ingest { limit: Some(10), .. }));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
