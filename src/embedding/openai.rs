//! OpenAI-compatible embeddings implementation.

use super::{prepare_input, Embedder};
use crate::config::EmbeddingSettings;
use crate::error::{Result, YtSearchError};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    send_dimensions: bool,
    batch_size: usize,
    max_input_chars: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder from settings.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let client = create_client(
            settings.api_base.as_deref(),
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
            send_dimensions: settings.send_dimensions,
            batch_size: settings.batch_size.max(1),
            max_input_chars: settings.max_input_chars.max(1),
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| YtSearchError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let input: Vec<String> = chunk
                .iter()
                .map(|t| prepare_input(t, self.max_input_chars).to_string())
                .collect();

            let mut args = CreateEmbeddingRequestArgs::default();
            args.model(&self.model).input(EmbeddingInput::StringArray(input));
            if self.send_dimensions {
                args.dimensions(self.dimensions as u32);
            }
            let request = args
                .build()
                .map_err(|e| YtSearchError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| YtSearchError::OpenAI(format!("Embedding API error: {}", e)))?;

            if response.data.len() != chunk.len() {
                return Err(YtSearchError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            for embedding_data in embeddings {
                if embedding_data.embedding.len() != self.dimensions {
                    return Err(YtSearchError::DimensionMismatch {
                        expected: self.dimensions,
                        actual: embedding_data.embedding.len(),
                    });
                }
                all_embeddings.push(embedding_data.embedding);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_embedder_from_settings() {
        let embedder = OpenAIEmbedder::from_settings(&EmbeddingSettings::default()).unwrap();
        assert_eq!(embedder.dimensions(), 384);
        assert_eq!(embedder.model(), "sentence-transformers/all-MiniLM-L6-v2");

        let settings = EmbeddingSettings {
            api_base: None,
            model: "text-embedding-3-small".to_string(),
            dimensions: 512,
            send_dimensions: true,
            batch_size: 0,
            ..EmbeddingSettings::default()
        };
        let embedder = OpenAIEmbedder::from_settings(&settings).unwrap();
        assert_eq!(embedder.dimensions(), 512);
        assert_eq!(embedder.batch_size, 1);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let embedder = OpenAIEmbedder::from_settings(&EmbeddingSettings::default()).unwrap();
        let embeddings = embedder.embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }

    /// Minimal `/embeddings` endpoint that records each request's `input`.
    async fn embeddings_endpoint(
        State(inputs): State<Arc<Mutex<Vec<Value>>>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let count = body["input"].as_array().map_or(1, |a| a.len());
        inputs.lock().unwrap().push(body["input"].clone());
        let data: Vec<Value> = (0..count)
            .map(|i| json!({ "object": "embedding", "index": i, "embedding": [0.5, 0.5] }))
            .collect();
        Json(json!({
            "object": "list",
            "model": "stub",
            "data": data,
            "usage": { "prompt_tokens": 0, "total_tokens": 0 }
        }))
    }

    #[tokio::test]
    async fn test_blank_query_sent_as_space() {
        let inputs = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1/embeddings", post(embeddings_endpoint))
            .with_state(inputs.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let settings = EmbeddingSettings {
            api_base: Some(format!("http://{}/v1", addr)),
            dimensions: 2,
            ..EmbeddingSettings::default()
        };
        let embedder = OpenAIEmbedder::from_settings(&settings).unwrap();

        let vector = embedder.embed("").await.unwrap();
        assert_eq!(vector, vec![0.5, 0.5]);

        let texts = vec!["pca".to_string(), "   ".to_string()];
        assert_eq!(embedder.embed_batch(&texts).await.unwrap().len(), 2);

        assert_eq!(
            *inputs.lock().unwrap(),
            vec![json!([" "]), json!(["pca", " "])]
        );
    }
}
