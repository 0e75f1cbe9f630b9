//! Agatha Oeiras storefront library.
//!
//! The ceramics shop and its admin area as a library, so the router can be
//! driven in-process by tests. The binary in `main.rs` only wires
//! configuration, tracing and the listener around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::state::AppState;

/// Build the storefront router over a session store.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, state.config());
    let static_dir = ServeDir::new(&state.config().static_dir);
    let uploads_dir = ServeDir::new(&state.config().uploads_dir);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .nest_service("/uploads", uploads_dir)
        .fallback(routes::not_found)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable while the primary store is unreachable,
/// even though pages keep rendering from the fallback.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.backends().primary.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
