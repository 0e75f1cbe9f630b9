//! Oeiras Core - Shared domain library.
//!
//! This crate provides the domain model used by every Oeiras component:
//! - `storefront` - Ceramics shop with its admin area
//! - `club` - Sports club admin console
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no database access, no HTTP clients. Persistence lives in `oeiras-cloud`.
//!
//! # Modules
//!
//! - [`types`] - Entity ids, prices and email addresses
//! - [`entity`] - The generic entity-kind model (`EntityKind`, `Record`)
//! - [`entities`] - Concrete kinds: products, players, coaches, coordinators
//! - [`cart`] - The per-session shopping cart state machine
//! - [`content`] - Singleton content records (about page) with built-in defaults

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod content;
pub mod entities;
pub mod entity;
pub mod types;

pub use cart::{Cart, CartError, LineItem};
pub use content::{AboutContent, ContentKind};
pub use entities::{Coach, Coordinator, Player, Product};
pub use entity::{EntityKind, Record, ValidationError};
pub use types::*;
