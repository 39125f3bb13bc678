//! Server error types with HTTP status code mapping

use analytics_model::StoreError;
use analytics_relay::RelayError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Server error type wrapping domain errors and providing HTTP status
/// mapping
#[derive(Error, Debug)]
pub enum ServerError {
    /// Storage layer error
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Query relay failure (OLAP engine unreachable or undecodable)
    #[error("{0}")]
    Relay(#[from] RelayError),

    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No or insufficient permission
    #[error("{0}")]
    Unauthorized(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Map error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Storage: not-found passes through, payload validation is a
            // client error, anything else is on us
            ServerError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Store(StoreError::InvalidPayload(_)) => StatusCode::BAD_REQUEST,
            ServerError::Store(StoreError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,

            // Relay failures are upstream failures, never client errors
            ServerError::Relay(_) => StatusCode::BAD_GATEWAY,

            ServerError::Json(_) => StatusCode::BAD_REQUEST,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ServerError::BadRequest(msg.into())
    }

    /// Create an unauthorized error (401)
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ServerError::Unauthorized(msg.into())
    }

    /// Create a not found error (404)
    pub fn not_found(msg: impl Into<String>) -> Self {
        ServerError::NotFound(msg.into())
    }

    /// Create an internal error (500)
    pub fn internal(msg: impl Into<String>) -> Self {
        ServerError::Internal(msg.into())
    }
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// HTTP status code
    pub status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
            status: status.as_u16(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            format!(r#"{{"error":"{}","status":{}}}"#, self, status.as_u16())
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ServerError::Store(StoreError::NotFound(7)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::bad_request("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::unauthorized("no").status_code(),
            StatusCode::UNAUTHORIZED
        );
        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert_eq!(
            ServerError::Relay(RelayError::Unavailable(refused)).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
