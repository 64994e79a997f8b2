use std::sync::Arc;

use api_router::{api_routes_v1, api_state::ApiState};
use axum::{extract::FromRef, Router};
use common::utils::config::get_config;
use retrieval_pipeline::VerseEngine;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> anyhow::Result<()> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    let engine = Arc::new(VerseEngine::from_config(&config)?);

    // Load the corpus before accepting traffic; a missing file leaves the
    // server up but every analysis reports not found.
    if engine.warm_up().await {
        info!(corpus = %config.corpus_path, "Corpus ready");
    } else {
        warn!(corpus = %config.corpus_path, "Serving without a corpus");
    }

    let app = build_app(ApiState::new(engine));

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_app(api_state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes_v1(&api_state))
        .with_state(AppState { api_state })
}

#[derive(Clone, FromRef)]
struct AppState {
    api_state: ApiState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use common::storage::{
        corpus::CorpusIndex, store::CorpusStore, types::verse_record::VerseRecord,
    };
    use retrieval_pipeline::{disambiguation::Disambiguator, RetrievalTuning};
    use tower::ServiceExt;

    #[tokio::test]
    async fn smoke_startup_with_preloaded_corpus() {
        let store = CorpusStore::preloaded(CorpusIndex::from_verses([VerseRecord::new(
            "Salmos 23:1",
            "O Senhor é o meu pastor, nada me faltará.",
        )]));
        let engine = VerseEngine::new(
            Arc::new(store),
            Disambiguator::default(),
            RetrievalTuning::default(),
        );
        let app = build_app(ApiState::new(Arc::new(engine)));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/live")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let ready_response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("ready response");
        assert_eq!(ready_response.status(), StatusCode::OK);

        let analyze_response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"text": "o senhor e o meu pastor"}"#))
                    .expect("request"),
            )
            .await
            .expect("analyze response");
        assert_eq!(analyze_response.status(), StatusCode::OK);
    }
}
