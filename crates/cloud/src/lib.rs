//! Oeiras Cloud - managed-service wiring shared by the storefront and club apps.
//!
//! # Modules
//!
//! - [`store`] - Document backends and the generic entity/content stores with
//!   primary-then-fallback persistence
//! - [`identity`] - Admin authentication against a Cognito user pool
//! - [`storage`] - Product image uploads to object storage with local-disk fallback
//! - [`email`] - Transactional email over SMTP
//! - [`config`] - Environment helpers and per-service configuration
//! - [`db`] - `PostgreSQL` pool and migrations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod email;
pub mod identity;
pub mod storage;
pub mod store;

pub use email::{EmailError, LogMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use identity::{
    AuthOutcome, AuthenticatedUser, CognitoClient, IdentityError, IdentityProvider,
    UnconfiguredIdentity,
};
pub use storage::{
    HttpObjectStorage, ImageUploader, LocalDiskStorage, ObjectStorage, StorageError, UploadedFile,
};
pub use store::{
    BackendError, Backends, ContentRecord, ContentStore, Degraded, DocumentBackend, EntityStore,
    Served, StoreError, served,
};
