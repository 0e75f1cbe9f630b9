//! Session-stored admin identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Presence of this value under [`keys::CURRENT_ADMIN`] opens the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAdmin {
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
    pub const CURRENT_ADMIN: &str = "current_admin";
}
