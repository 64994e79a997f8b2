use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use routes::{analyze::analyze_phrase, liveness::live, readiness::ready};

pub mod api_state;
pub mod error;
mod routes;

/// Phrases are short; anything larger is rejected before deserialization.
const ANALYZE_MAX_BODY_BYTES: usize = 16 * 1024;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>(_app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Probes for k8s/systemd
    let probes = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    let engine = Router::new().route(
        "/analyze",
        post(analyze_phrase).layer(DefaultBodyLimit::max(ANALYZE_MAX_BODY_BYTES)),
    );

    probes.merge(engine)
}
