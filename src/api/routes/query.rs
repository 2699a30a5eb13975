use axum::{extract::State, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::Answer;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

pub async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Answer>, ApiError> {
    let answer = state
        .rag_service
        .answer(&request.query)
        .await
        .map_err(ApiError::query_failed)?;

    if answer.context.is_degraded() {
        tracing::info!(
            dropped = answer.context.dropped,
            truncated = answer.context.truncated,
            "answer built from reduced context"
        );
    }

    Ok(Json(answer))
}
