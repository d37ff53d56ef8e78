//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use trygr_domain::error::TrygrError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`TrygrError`] to an HTTP response with appropriate status code.
pub struct ApiError(TrygrError);

impl From<TrygrError> for ApiError {
    fn from(err: TrygrError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            TrygrError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            TrygrError::MalformedTrigger(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            TrygrError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            TrygrError::UnsupportedVendor(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string())
            }
            TrygrError::ActionFailed(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            TrygrError::NotificationFailed(err) => {
                tracing::warn!(error = %err, "notification error");
                (StatusCode::BAD_GATEWAY, self.0.to_string())
            }
            TrygrError::Storage(err) => {
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
