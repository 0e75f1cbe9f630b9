//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, `PostgreSQL` or in-memory store)
//! 4. Admin gate (`RequireAdmin` extractor on `/admin/*` handlers)

pub mod auth;
pub mod session;

pub use auth::{
    AdminRejection, LOGIN_PATH, OptionalAdmin, RequireAdmin, clear_current_admin,
    set_current_admin,
};
pub use session::create_session_layer;
