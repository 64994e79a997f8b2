use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness probe: returns 200 once the corpus is loaded, else 503.
///
/// The first probe triggers the lazy corpus load.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    if state.engine.warm_up().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "corpus": "ok" }
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "corpus": "fail" },
                "reason": format!(
                    "corpus unavailable at {}",
                    state.engine.corpus().path().display()
                )
            })),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api_routes_v1,
        routes::test_support::{loaded_state, state_with_store},
    };
    use axum::{body::Body, http::Request};
    use common::storage::{corpus::CorpusFormat, store::CorpusStore};
    use tower::ServiceExt;

    async fn probe(state: ApiState) -> StatusCode {
        api_routes_v1(&state)
            .with_state(state)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response")
            .status()
    }

    #[tokio::test]
    async fn loaded_corpus_is_ready() {
        assert_eq!(probe(loaded_state()).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_corpus_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CorpusStore::new(dir.path().join("ausente.txt"), CorpusFormat::default());

        assert_eq!(
            probe(state_with_store(store)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
