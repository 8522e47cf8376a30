//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use smarthub_domain::error::SmartHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`SmartHubError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(SmartHubError);

impl<E: Into<SmartHubError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SmartHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            SmartHubError::InvalidJobFormat(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            SmartHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            SmartHubError::UnsupportedDeviceType(err) => {
                tracing::error!(error = %err, "stored device has an unsupported type");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            SmartHubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
