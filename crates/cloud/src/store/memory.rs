//! Process-local backend.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use super::backend::{BackendError, DocumentBackend};

/// Collections and counters held in memory.
///
/// Shared with [`JsonFileBackend`](super::JsonFileBackend), which snapshots it
/// to disk after each write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct Tables {
    #[serde(default)]
    pub collections: HashMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    pub sequences: HashMap<String, i64>,
}

impl Tables {
    pub fn scan(&self, collection: &str) -> Vec<(String, Value)> {
        self.collections
            .get(collection)
            .map(|docs| docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, collection: &str, key: &str) -> Option<Value> {
        self.collections.get(collection)?.get(key).cloned()
    }

    pub fn put(&mut self, collection: &str, key: &str, body: &Value) {
        self.collections
            .entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), body.clone());
    }

    pub fn delete(&mut self, collection: &str, key: &str) -> bool {
        self.collections
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(key).is_some())
    }

    pub fn next_sequence(&mut self, collection: &str) -> Result<i64, BackendError> {
        let counter = self.sequences.entry(collection.to_owned()).or_insert(0);
        *counter = counter
            .checked_add(1)
            .ok_or_else(|| BackendError::SequenceExhausted(collection.to_owned()))?;
        Ok(*counter)
    }

    pub fn observe_sequence(&mut self, collection: &str, value: i64) {
        let counter = self.sequences.entry(collection.to_owned()).or_insert(0);
        *counter = (*counter).max(value);
    }
}

/// In-memory fallback backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn scan(&self, collection: &str) -> Result<Vec<(String, Value)>, BackendError> {
        Ok(self.tables.read().await.scan(collection))
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, BackendError> {
        Ok(self.tables.read().await.get(collection, key))
    }

    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<(), BackendError> {
        self.tables.write().await.put(collection, key, body);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, BackendError> {
        Ok(self.tables.write().await.delete(collection, key))
    }

    async fn next_sequence(&self, collection: &str) -> Result<i64, BackendError> {
        self.tables.write().await.next_sequence(collection)
    }

    async fn observe_sequence(&self, collection: &str, value: i64) -> Result<(), BackendError> {
        self.tables.write().await.observe_sequence(collection, value);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let backend = MemoryBackend::new();
        backend.put("products", "1", &json!({"name": "Bowl"})).await.unwrap();

        assert_eq!(
            backend.get("products", "1").await.unwrap(),
            Some(json!({"name": "Bowl"}))
        );
        assert!(backend.get("players", "1").await.unwrap().is_none());
        assert!(backend.delete("products", "1").await.unwrap());
        assert!(!backend.delete("products", "1").await.unwrap());
    }

    #[tokio::test]
    async fn test_sequences_are_per_collection_and_monotonic() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.next_sequence("products").await.unwrap(), 1);
        assert_eq!(backend.next_sequence("products").await.unwrap(), 2);
        assert_eq!(backend.next_sequence("other").await.unwrap(), 1);

        backend.observe_sequence("products", 10).await.unwrap();
        backend.observe_sequence("products", 4).await.unwrap();
        assert_eq!(backend.next_sequence("products").await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_exhausted_sequence_is_an_error() {
        let backend = MemoryBackend::new();
        backend.observe_sequence("products", i64::MAX).await.unwrap();
        assert!(matches!(
            backend.next_sequence("products").await,
            Err(BackendError::SequenceExhausted(_))
        ));
        backend.observe_sequence("products", 1).await.unwrap();
        assert!(backend.next_sequence("products").await.is_err());
    }
}
