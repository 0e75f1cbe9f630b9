//! JSON API errors.
//!
//! Every handler returns `Result<T, AppError>`; failures render as
//! `{"error": "..."}`. Server-side failures are captured to Sentry.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use oeiras_cloud::{EmailError, IdentityError, StoreError};
use oeiras_core::ValidationError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Credentials refused by the identity provider.
    #[error("{0}")]
    Unauthorized(String),

    /// Signed in, but not an administrator.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Validation(_)) | Self::Validation(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Store(StoreError::BackendUnavailable { .. } | StoreError::Fallback(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Identity(_) | Self::Email(_) => StatusCode::BAD_GATEWAY,
            Self::Store(StoreError::Corrupt(_)) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(StoreError::NotFound(_)) => "Record not found".to_string(),
            Self::Store(StoreError::Validation(e)) | Self::Validation(e) => e.to_string(),
            Self::Store(StoreError::BackendUnavailable { .. } | StoreError::Fallback(_)) => {
                "Service temporarily unavailable".to_string()
            }
            Self::Identity(_) => "Authentication failed. Please check your credentials.".to_string(),
            Self::Email(_) => "Failed to send email".to_string(),
            Self::Store(StoreError::Corrupt(_)) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Unauthorized(_) | Self::Forbidden(_) | Self::NotFound(_) | Self::BadRequest(_) => {
                self.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after an admin signs in.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
