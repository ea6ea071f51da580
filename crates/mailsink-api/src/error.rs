//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Error returned by API handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Plain status without a domain error behind it
    #[error("{0}")]
    Status(StatusCode),

    #[error(transparent)]
    Domain(#[from] mailsink_common::Error),
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        ApiError::Status(status)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Status(status) => *status,
            ApiError::Domain(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            ApiError::Status(status) => (
                status.canonical_reason().unwrap_or("ERROR").to_uppercase().replace(' ', "_"),
                status.to_string(),
            ),
            ApiError::Domain(e) => {
                if status.is_server_error() {
                    error!("API error: {}", e);
                }
                (e.code().to_string(), e.to_string())
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            })),
        )
            .into_response()
    }
}
