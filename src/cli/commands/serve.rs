//! HTTP search API.
//!
//! Loads the video table once at startup and answers searches against it.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::search::SearchEngine;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state.
pub struct AppState {
    engine: SearchEngine,
}

impl AppState {
    pub fn new(engine: SearchEngine) -> Self {
        Self { engine }
    }
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::warning(&format!("{}", e));
    }

    let engine = SearchEngine::from_settings(&settings)?;
    let videos = engine.table().len();
    let state = Arc::new(AppState::new(engine));

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("ytsearch API Server");
    println!();
    Output::success(&format!("Listening on http://{} ({} videos loaded)", addr, videos));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET /");
    Output::kv("Info", "GET /info");
    Output::kv("Search", "GET /search?query=<text>");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/info", get(info))
        .route("/search", get(search))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchQuery {
    query: String,
}

#[derive(Serialize)]
struct InfoResponse {
    name: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "health_check": "OK" }))
}

async fn info() -> impl IntoResponse {
    Json(InfoResponse {
        name: "ytsearch",
        description: "Semantic search over a YouTube channel's videos. Titles and transcripts \
                      are embedded with a sentence-embedding model and matched to the query \
                      by Manhattan distance.",
    })
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    match state.engine.search(&params.query).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => {
            error!("Search failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::StubEmbedder;
    use crate::search::SearchParams;
    use crate::store::test_support::record;
    use crate::store::{EmbeddingSignature, VideoTable};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(embedder: StubEmbedder, records: Vec<crate::store::VideoRecord>) -> Router {
        let table = VideoTable::new(EmbeddingSignature::new("stub", 2), records).unwrap();
        let engine = SearchEngine::new(Arc::new(table), Arc::new(embedder), SearchParams::default());
        router(Arc::new(AppState::new(engine)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(app(StubEmbedder::new(vec![0.0, 0.0]), vec![]), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "health_check": "OK" }));
    }

    #[tokio::test]
    async fn test_info() {
        let (status, body) = get_json(app(StubEmbedder::new(vec![0.0, 0.0]), vec![]), "/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "ytsearch");
        assert!(body["description"].is_string());
    }

    #[tokio::test]
    async fn test_search_returns_parallel_lists() {
        let embedder = StubEmbedder::new(vec![90.0, 90.0]).with("pca", vec![0.0, 0.0]);
        let records = vec![
            record("far", "Far away", vec![50.0, 50.0], None),
            record(
                "_UVHneBUBW0",
                "Principal Component Analysis (PCA) clearly explained (2015)",
                vec![0.5, 0.5],
                None,
            ),
        ];

        let (status, body) = get_json(app(embedder, records), "/search?query=pca").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "title": ["Principal Component Analysis (PCA) clearly explained (2015)"],
                "video_id": ["_UVHneBUBW0"],
            })
        );
    }

    #[tokio::test]
    async fn test_search_empty_table() {
        let (status, body) = get_json(
            app(StubEmbedder::new(vec![0.0, 0.0]), vec![]),
            "/search?query=anything",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "title": [], "video_id": [] }));
    }

    #[tokio::test]
    async fn test_search_empty_query_is_valid() {
        let records = vec![record("a", "A", vec![0.0, 0.0], None)];
        let (status, body) = get_json(app(StubEmbedder::new(vec![0.0, 0.0]), records), "/search?query=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["video_id"], serde_json::json!(["a"]));
    }

    #[tokio::test]
    async fn test_search_missing_query_is_client_error() {
        let (status, _) = get_json(app(StubEmbedder::new(vec![0.0, 0.0]), vec![]), "/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_embedding_failure_is_server_error() {
        let records = vec![record("a", "A", vec![0.0, 0.0], None)];
        let (status, body) = get_json(app(StubEmbedder::failing(2), records), "/search?query=pca").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("model unavailable"));
    }
}
