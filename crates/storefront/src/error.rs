//! Unified error handling with Sentry integration.
//!
//! Handlers that answer JSON return `Result<T, AppError>`; the error renders
//! as `{"error": "..."}` with a status derived from the failing layer.
//! Server-side failures are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use oeiras_cloud::{IdentityError, StorageError, StoreError};
use oeiras_core::{CartError, ValidationError};
use serde_json::json;
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Entity or content store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Cart transition rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Input rejected before touching any store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Image upload failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Identity provider call failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::ProductNotFound(_) | CartError::ItemNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Store(StoreError::Validation(_))
            | Self::Cart(CartError::InvalidQuantity)
            | Self::Validation(_)
            | Self::Storage(StorageError::Invalid(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::BackendUnavailable { .. } | StoreError::Fallback(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Storage(_) | Self::Identity(_) => StatusCode::BAD_GATEWAY,
            Self::Store(StoreError::Corrupt(_))
            | Self::Session(_)
            | Self::Template(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Cart(CartError::ProductNotFound(_)) => "Product not found".to_string(),
            Self::Cart(CartError::ItemNotFound(_)) => "Item not found in cart".to_string(),
            Self::Store(StoreError::NotFound(_)) => "Record not found".to_string(),
            Self::Store(StoreError::Validation(e))
            | Self::Validation(e)
            | Self::Storage(StorageError::Invalid(e)) => e.to_string(),
            Self::Store(StoreError::BackendUnavailable { .. } | StoreError::Fallback(_)) => {
                "Service temporarily unavailable".to_string()
            }
            Self::Storage(_) => "Image upload failed".to_string(),
            Self::Identity(_) => "External service error".to_string(),
            Self::Store(StoreError::Corrupt(_))
            | Self::Session(_)
            | Self::Template(_)
            | Self::Internal(_) => "Internal server error".to_string(),
            Self::Cart(CartError::InvalidQuantity) | Self::NotFound(_) | Self::BadRequest(_) => {
                self.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
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

/// Result type alias for `AppError`.
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

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
