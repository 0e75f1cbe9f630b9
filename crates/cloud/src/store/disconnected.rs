//! Primary backend used when no database is configured.

use async_trait::async_trait;
use serde_json::Value;

use super::backend::{BackendError, DocumentBackend};

/// Fails every call with [`BackendError::NotConfigured`], so stores run on
/// their fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedBackend;

#[async_trait]
impl DocumentBackend for DisconnectedBackend {
    fn backend_tag(&self) -> &'static str {
        "disconnected"
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Err(BackendError::NotConfigured)
    }

    async fn scan(&self, _collection: &str) -> Result<Vec<(String, Value)>, BackendError> {
        Err(BackendError::NotConfigured)
    }

    async fn get(&self, _collection: &str, _key: &str) -> Result<Option<Value>, BackendError> {
        Err(BackendError::NotConfigured)
    }

    async fn put(&self, _collection: &str, _key: &str, _body: &Value) -> Result<(), BackendError> {
        Err(BackendError::NotConfigured)
    }

    async fn delete(&self, _collection: &str, _key: &str) -> Result<bool, BackendError> {
        Err(BackendError::NotConfigured)
    }

    async fn next_sequence(&self, _collection: &str) -> Result<i64, BackendError> {
        Err(BackendError::NotConfigured)
    }

    async fn observe_sequence(&self, _collection: &str, _value: i64) -> Result<(), BackendError> {
        Err(BackendError::NotConfigured)
    }
}
