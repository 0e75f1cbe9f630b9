//! Document persistence with fallback substitution.
//!
//! Every store holds two [`DocumentBackend`]s: the primary (networked) one and
//! a process-local fallback. Reads try the primary and substitute the fallback
//! on failure, reporting it as [`Degraded`]. Writes try the primary and, on
//! failure, apply the same write to the fallback so that later reads in this
//! process agree with what the caller was told. Primary and fallback are never
//! reconciled afterwards.

mod backend;
mod content;
mod disconnected;
mod entity;
mod json_file;
mod memory;
mod postgres;

use std::sync::Arc;

use oeiras_core::{EntityId, ValidationError};
use thiserror::Error;

pub use backend::{BackendError, DocumentBackend};
pub use content::{ContentRecord, ContentStore};
pub use disconnected::DisconnectedBackend;
pub use entity::EntityStore;
pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use postgres::PostgresBackend;

/// Shared handle to a backend.
pub type SharedBackend = Arc<dyn DocumentBackend>;

/// A value served from the fallback because the primary failed.
#[derive(Debug)]
pub struct Degraded<T> {
    /// What the caller gets instead.
    pub value: T,
    /// The primary failure that triggered substitution.
    pub cause: BackendError,
}

impl<T> Degraded<T> {
    /// Drop the cause and keep the substituted value.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// A read (or write) answered by the primary, or by the fallback.
pub type Served<T> = Result<T, Degraded<T>>;

/// Collapse a possibly degraded read into its value.
pub fn served<T>(result: Served<T>) -> T {
    result.unwrap_or_else(Degraded::into_value)
}

/// Errors surfaced by write paths.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(EntityId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Both the primary and the fallback failed.
    #[error("storage unavailable: {primary}; fallback also failed: {fallback}")]
    BackendUnavailable {
        primary: BackendError,
        fallback: BackendError,
    },

    /// The fallback failed while serving a degraded operation.
    #[error("fallback storage failed: {0}")]
    Fallback(BackendError),

    #[error("stored document is not a valid record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The pair of backends every store is built on.
#[derive(Clone)]
pub struct Backends {
    pub primary: SharedBackend,
    pub fallback: SharedBackend,
}

impl Backends {
    pub fn new(primary: SharedBackend, fallback: SharedBackend) -> Self {
        Self { primary, fallback }
    }

    /// Primary permanently unavailable, in-memory fallback. Used when no
    /// database is configured and in tests.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            primary: Arc::new(DisconnectedBackend),
            fallback: Arc::new(MemoryBackend::new()),
        }
    }

    /// Both backends in memory, so the "primary" always answers.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            primary: Arc::new(MemoryBackend::new()),
            fallback: Arc::new(MemoryBackend::new()),
        }
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("primary", &self.primary.backend_tag())
            .field("fallback", &self.fallback.backend_tag())
            .finish()
    }
}
