//! Session middleware configuration.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::ClubConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "oeiras_club_session";

/// Session expiry time in seconds (24 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer over the given store.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &ClubConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
