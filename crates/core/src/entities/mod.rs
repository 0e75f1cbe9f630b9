//! Concrete entity kinds.
//!
//! The shop catalog uses integer ids; the club records use prefixed string ids.

mod coach;
mod coordinator;
mod player;
mod product;

pub use coach::Coach;
pub use coordinator::Coordinator;
pub use player::Player;
pub use product::Product;

use crate::entity::ValidationError;
use crate::types::Email;

/// Validate an optional email field: blank is allowed, anything else must parse.
pub(crate) fn optional_email(value: Option<&str>) -> Result<(), ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(()),
        Some(raw) => Email::parse(raw)
            .map(|_| ())
            .map_err(|_| ValidationError::invalid("email", "a valid email address")),
    }
}
