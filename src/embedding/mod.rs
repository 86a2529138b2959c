//! Embedding generation for titles, transcripts and queries.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
///
/// Ingestion and query serving must use the same implementation and model,
/// otherwise distances between stored and query vectors are meaningless.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Identifier of the model producing the vectors.
    fn model(&self) -> &str;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Truncate text to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Sent in place of blank input, which OpenAI-compatible servers reject.
const BLANK_INPUT: &str = " ";

/// Shape a text for the embeddings endpoint: truncated, and never empty.
///
/// Applied to stored fields and queries alike, so a blank query lands on the
/// same vector every time instead of failing the request.
pub fn prepare_input(text: &str, max_chars: usize) -> &str {
    let text = truncate_chars(text, max_chars);
    if text.trim().is_empty() {
        BLANK_INPUT
    } else {
        text
    }
}
