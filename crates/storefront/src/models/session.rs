//! Session-related types.
//!
//! The cart and the admin sign-in both live in the visitor's session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session-stored admin identity.
///
/// Presence of this value under [`keys::CURRENT_ADMIN`] is what the admin
/// gate checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Identity provider username.
    pub username: String,
    pub logged_in_at: DateTime<Utc>,
}

impl CurrentAdmin {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            logged_in_at: Utc::now(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
