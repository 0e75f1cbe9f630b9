//! Core value types for Oeiras.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use id::{EntityId, IdStrategy};
pub use price::Price;
