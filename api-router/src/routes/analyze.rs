use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use retrieval_pipeline::RetrievalResult;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub text: String,
}

pub async fn analyze_phrase(
    State(state): State<ApiState>,
    Json(input): Json<AnalyzeParams>,
) -> Result<impl IntoResponse, ApiError> {
    if input.text.trim().is_empty() {
        return Err(ApiError::ValidationError("text must not be empty".to_string()));
    }

    info!(text_bytes = input.text.len(), "Received analyze request");

    let result = state.engine.analyze(&input.text).await;
    let passage = result.passage();

    let body = match result {
        RetrievalResult::Found {
            reference,
            text,
            context,
        } => json!({
            "status": "found",
            "reference": reference,
            "text": text,
            "context": context,
            "passage": passage,
        }),
        RetrievalResult::NotFound => json!({ "status": "not_found" }),
    };

    Ok((StatusCode::OK, Json(body)))
}
