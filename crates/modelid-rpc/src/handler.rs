//! HTTP request handlers.
//!
//! The model-info flow mirrors its upstream contract exactly: every failure
//! becomes a 404 with one of three distinct reason strings, and a
//! successful remote lookup is passed through verbatim.

use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use modelid_core::{ModelIdError, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// POST /model-info — resolve a model name, hash it, and look it up.
///
/// Request body: `{"name": "<logical model name>"}`. On success the remote
/// metadata payload is returned verbatim with status 200; every failure is
/// a 404 whose reason distinguishes the failing stage.
pub async fn handle_model_info(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Value>,
) -> Response {
    let name = request.get("name").and_then(Value::as_str).map(str::trim);
    let Some(name) = name.filter(|name| !name.is_empty()) else {
        return not_found("missing name in request");
    };

    debug!(name = %name, "model info request");

    match model_info(&state, name).await {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(err) => {
            warn!(name = %name, error = %err, "model info request failed");
            not_found(&reason_for(&err, name))
        }
    }
}

/// The resolution chain: name → path → digest → remote metadata.
async fn model_info(state: &AppState, name: &str) -> Result<Value> {
    let path = state.registry.resolve_any(name)?;
    let digest = state.cache.get_or_compute(&path).await?;
    debug!(path = %path.display(), digest = %digest, "resolved model");
    state.client.lookup_by_hash(&digest).await
}

/// Map a chain failure to its observable reason string.
fn reason_for(err: &ModelIdError, name: &str) -> String {
    match err {
        ModelIdError::ModelNotFound { .. } | ModelIdError::UnknownCategory { .. } => {
            format!("failed to find a model for '{name}'.")
        }
        ModelIdError::Io { .. } => "failed to generate a file hash.".to_string(),
        other => other.to_string(),
    }
}

fn not_found(reason: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"error": reason}))).into_response()
}

/// POST /annotate — add `*_hash` fields to a prompt graph.
///
/// Body is the node graph (a JSON object of node records); the annotated
/// graph is returned. Unresolvable references are skipped per the
/// annotator's best-effort contract.
pub async fn handle_annotate(
    State(state): State<Arc<AppState>>,
    Json(graph): Json<Value>,
) -> Response {
    let Value::Object(mut nodes) = graph else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "graph must be a JSON object"})),
        )
            .into_response();
    };

    // Annotation hashes model files with blocking reads; run it on the
    // blocking pool so a multi-gigabyte file cannot pin an async worker.
    let annotated = tokio::task::spawn_blocking(move || {
        let mut annotator = state
            .annotator
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        annotator.annotate(&mut nodes);
        nodes
    })
    .await;

    match annotated {
        Ok(nodes) => (StatusCode::OK, Json(Value::Object(nodes))).into_response(),
        Err(err) => {
            error!(error = %err, "annotation task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "annotation task failed"})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelid_core::{CivitaiClient, PathRegistry};
    use tempfile::TempDir;

    fn test_state(root: &TempDir) -> Arc<AppState> {
        for sub in ["checkpoints", "loras", "vae"] {
            std::fs::create_dir_all(root.path().join(sub)).unwrap();
        }
        let registry = PathRegistry::standard_layout(root.path());
        // Unroutable base URL: these tests never reach the network.
        let client = CivitaiClient::with_base_url("http://192.0.2.1:9").unwrap();
        Arc::new(AppState::new(registry, client))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_name_field() {
        let root = TempDir::new().unwrap();
        let response =
            handle_model_info(State(test_state(&root)), Json(json!({"model": "x"}))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("missing name in request"));
    }

    #[tokio::test]
    async fn test_blank_name_treated_as_missing() {
        let root = TempDir::new().unwrap();
        let response =
            handle_model_info(State(test_state(&root)), Json(json!({"name": "   "}))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("missing name in request"));
    }

    #[tokio::test]
    async fn test_unknown_model_reason() {
        let root = TempDir::new().unwrap();
        let response = handle_model_info(
            State(test_state(&root)),
            Json(json!({"name": "missing.safetensors"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response)
            .await
            .contains("failed to find a model for 'missing.safetensors'."));
    }

    #[tokio::test]
    async fn test_network_failure_reason_is_not_a_model_error() {
        // The file resolves and hashes, then the unroutable lookup fails:
        // the reason must be the network message, not the not-found ones.
        let root = TempDir::new().unwrap();
        let state = test_state(&root);
        std::fs::write(root.path().join("checkpoints/model.safetensors"), b"w").unwrap();

        let response = handle_model_info(
            State(state),
            Json(json!({"name": "model.safetensors"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_string(response).await;
        assert!(!body.contains("failed to find a model"));
        assert!(!body.contains("failed to generate a file hash"));
    }

    #[test]
    fn test_hash_failure_reason() {
        let err = ModelIdError::Io {
            message: "permission denied".into(),
            path: None,
            source: None,
        };
        assert_eq!(reason_for(&err, "m"), "failed to generate a file hash.");
    }

    #[tokio::test]
    async fn test_annotate_rejects_non_object_graph() {
        let root = TempDir::new().unwrap();
        let response = handle_annotate(State(test_state(&root)), Json(json!([1, 2]))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_annotate_adds_hash_fields() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);
        std::fs::write(root.path().join("checkpoints/model.safetensors"), b"w").unwrap();

        let response = handle_annotate(
            State(state),
            Json(json!({"1": {"inputs": {"ckpt_name": "model.safetensors"}}})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body["1"]["ckpt_hash"].is_string());
        assert_eq!(body["1"]["inputs"]["ckpt_name"], "model.safetensors");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_annotate_requests() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);
        std::fs::write(root.path().join("checkpoints/model.safetensors"), b"w").unwrap();

        let graph = json!({"1": {"inputs": {"ckpt_name": "model.safetensors"}}});
        let a = tokio::spawn(handle_annotate(State(state.clone()), Json(graph.clone())));
        let b = tokio::spawn(handle_annotate(State(state), Json(graph)));

        for handle in [a, b] {
            let response = handle.await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
            assert!(body["1"]["ckpt_hash"].is_string());
        }
    }

    /// Serve a single canned HTTP/1.1 JSON response, then shut down.
    async fn spawn_canned_json_server(body: &'static str) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request).await.unwrap();
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_success_passes_remote_payload_through() {
        let payload = r#"{"id": 7, "model": {"name": "Example"}, "files": []}"#;
        let addr = spawn_canned_json_server(payload).await;

        let root = TempDir::new().unwrap();
        for sub in ["checkpoints", "loras", "vae"] {
            std::fs::create_dir_all(root.path().join(sub)).unwrap();
        }
        std::fs::write(root.path().join("checkpoints/model.safetensors"), b"w").unwrap();
        let registry = PathRegistry::standard_layout(root.path());
        let client = CivitaiClient::with_base_url(format!("http://{addr}")).unwrap();
        let state = Arc::new(AppState::new(registry, client));

        let response =
            handle_model_info(State(state), Json(json!({"name": "model.safetensors"}))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, serde_json::from_str::<Value>(payload).unwrap());
    }
}
