//! # API Errors
//!
//! One error enum for every handler, mapped onto the JSON envelope the
//! frontend expects: `{success, data?, error?, message?}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use finlearn_core::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// The wire envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Successful envelope around `data`.
pub fn ok<T: Serialize>(data: T) -> Json<ApiEnvelope<T>> {
    Json(ApiEnvelope {
        success: true,
        data: Some(data),
        error: None,
        message: None,
    })
}

/// Successful envelope with a human-readable message.
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiEnvelope<T>> {
    Json(ApiEnvelope {
        success: true,
        data: Some(data),
        error: None,
        message: Some(message.into()),
    })
}

// =============================================================================
// ERRORS
// =============================================================================

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Access denied. No token provided.")]
    MissingToken,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Too many requests from this IP, please try again later.")]
    RateLimited,

    /// Detail is logged server-side, never sent to the client.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MissingToken | Self::InvalidToken | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken(_) => Self::Validation("User already exists".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(%detail, "request failed");
        }

        let envelope: ApiEnvelope<()> = ApiEnvelope {
            success: false,
            data: None,
            error: Some(self.to_string()),
            message: None,
        };
        (self.status(), Json(envelope)).into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_error_classes() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("Lesson").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::RateLimited.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn duplicate_email_maps_to_the_known_message() {
        let err = ApiError::from(StoreError::EmailTaken("a@b.c".into()));
        assert_eq!(err.to_string(), "User already exists");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_renders_subject() {
        assert_eq!(ApiError::NotFound("Lesson").to_string(), "Lesson not found");
    }
}
