//! HTTP middleware stack for the club console.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, `PostgreSQL` or in-memory store)
//! 4. API gate (`RequireAdmin` extractor on `/api/*` handlers)

pub mod auth;
pub mod session;

pub use auth::{RequireAdmin, Unauthorized, clear_current_admin, set_current_admin};
pub use session::create_session_layer;
