//! The document backend seam.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure talking to a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("backend not configured")]
    NotConfigured,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("id sequence for {0} is exhausted")]
    SequenceExhausted(String),
}

/// A keyed JSON document store partitioned into collections.
///
/// Keys are the string form of an entity id (`"7"`, `"player_…"`) or a
/// content key (`"about"`).
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Short name for logs (`postgres`, `memory`, ...).
    fn backend_tag(&self) -> &'static str;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), BackendError>;

    /// Every document in a collection, in no particular order.
    async fn scan(&self, collection: &str) -> Result<Vec<(String, Value)>, BackendError>;

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, BackendError>;

    /// Insert or replace.
    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<(), BackendError>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, key: &str) -> Result<bool, BackendError>;

    /// Atomically advance and return the collection's id counter.
    async fn next_sequence(&self, collection: &str) -> Result<i64, BackendError>;

    /// Raise the collection's id counter to at least `value`.
    async fn observe_sequence(&self, collection: &str, value: i64) -> Result<(), BackendError>;
}
