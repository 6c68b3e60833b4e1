//! Error types for the command API.
//!
//! [`ApiError`] covers requests the server refuses outright. It converts
//! into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Engine and
//! store failures never reach this type: they are answered with a generic
//! chat line so the bridge always has something to say.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the command API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// `playerName` or `command` was absent or blank.
    #[error("Missing playerName or command")]
    MissingField,

    /// The request body was not the expected JSON shape.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_matches_bridge_contract() {
        assert_eq!(ApiError::MissingField.to_string(), "Missing playerName or command");
    }

    #[test]
    fn api_errors_are_bad_requests() {
        let response = ApiError::InvalidBody("nope".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
