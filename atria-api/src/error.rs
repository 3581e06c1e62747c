use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use atria_core::WorkflowError;
use atria_domain::StoreError;

/// Boundary error type. Every failure leaves the service as
/// `{ "error": message }` with a status code per kind; backend details stay
/// in the logs.
#[derive(Debug)]
pub enum ApiError {
    Authentication(String),
    Workflow(WorkflowError),
    Internal(String),
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        ApiError::Workflow(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Workflow(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Workflow(err) => match err {
                WorkflowError::Unauthorized(_) => (StatusCode::FORBIDDEN, err.to_string()),
                WorkflowError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                WorkflowError::Validation(_) | WorkflowError::InvalidSignature => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                WorkflowError::RoomUnavailable => (StatusCode::CONFLICT, err.to_string()),
                WorkflowError::Upstream(_) => {
                    tracing::error!("Gateway error: {}", err);
                    (StatusCode::BAD_GATEWAY, err.to_string())
                }
                WorkflowError::Store(StoreError::NotFound) => {
                    (StatusCode::NOT_FOUND, "record not found".to_string())
                }
                WorkflowError::Store(StoreError::Conflict) => {
                    (StatusCode::CONFLICT, "conflicting booking state".to_string())
                }
                WorkflowError::Store(StoreError::Backend(msg)) => {
                    tracing::error!("Storage error: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
                }
            },
            ApiError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
