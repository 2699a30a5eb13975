use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::DomainError;
use crate::infrastructure::JobResult;

pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResult>, ApiError> {
    state
        .job_status
        .job_status(&job_id)
        .await?
        .map(Json)
        .ok_or_else(|| DomainError::not_found(format!("job {job_id}")).into())
}
