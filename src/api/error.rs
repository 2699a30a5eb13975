use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::{DomainError, FailureKind, ReasonCode};

/// Error body shared by every route: `{"error": ..., "reason": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    reason: ReasonCode,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    reason: ReasonCode,
}

impl ApiError {
    /// Query failures hide the cause behind a fixed message; the reason
    /// code still tells clients what went wrong.
    pub fn query_failed(err: DomainError) -> Self {
        let mut api = Self::from(err);
        api.message = "could not produce an answer".to_string();
        api
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::InputTooLarge { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Capability {
            kind: FailureKind::Transient,
            ..
        }
        | DomainError::RetriesExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Capability {
            kind: FailureKind::Permanent,
            ..
        } => StatusCode::BAD_GATEWAY,
        DomainError::Pipeline { source, .. } => status_for(source),
        DomainError::Configuration(_)
        | DomainError::DimensionMismatch { .. }
        | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, reason = ?err.reason_code(), "request failed");
        } else {
            tracing::debug!(error = %err, "request rejected");
        }
        Self {
            status,
            message: err.to_string(),
            reason: err.reason_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            reason: self.reason,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stage;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(DomainError::not_found("doc")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DomainError::transient(Stage::Search, "timeout")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        let err = DomainError::InputTooLarge {
            stage: Stage::Generation,
            tokens: 10,
            limit: 5,
        };
        let api = ApiError::query_failed(err);
        assert_eq!(api.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.reason, ReasonCode::InputTooLarge);
    }
}
