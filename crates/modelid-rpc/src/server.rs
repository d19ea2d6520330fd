//! HTTP server implementation using Axum.

use crate::handler::{handle_annotate, handle_health, handle_model_info};
use axum::{
    routing::{get, post},
    Router,
};
use modelid_core::config::CacheConfig;
use modelid_core::{CivitaiClient, GraphAnnotator, PathRegistry, SharedDigestCache};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    /// Category → search roots, supplied at startup
    pub registry: PathRegistry,
    /// Digest cache for the request-serving flow
    pub cache: SharedDigestCache,
    /// Metadata service client
    pub client: CivitaiClient,
    /// Graph annotator with its own independent digest cache. Annotation
    /// hashes files synchronously, so handlers take this lock inside
    /// `spawn_blocking` — hence a std mutex, never held across an await.
    pub annotator: Mutex<GraphAnnotator>,
}

impl AppState {
    pub fn new(registry: PathRegistry, client: CivitaiClient) -> Self {
        Self {
            annotator: Mutex::new(GraphAnnotator::new(registry.clone())),
            cache: SharedDigestCache::new(CacheConfig::LOOKUP_CACHE_CAPACITY),
            client,
            registry,
        }
    }
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let state = Arc::new(state);

    // Permissive CORS: the browser-side node UI calls this from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/model-info", post(handle_model_info))
        .route("/annotate", post(handle_annotate))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    Ok(actual_addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_server_starts() {
        let temp_dir = TempDir::new().unwrap();
        let registry = PathRegistry::standard_layout(temp_dir.path());
        let client = CivitaiClient::new().unwrap();

        let addr = start_server(AppState::new(registry, client), "127.0.0.1", 0)
            .await
            .unwrap();
        assert!(addr.port() > 0);
    }
}
