//! Fallback backend persisted to a single local JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::backend::{BackendError, DocumentBackend};
use super::memory::Tables;

/// Same semantics as [`MemoryBackend`](super::MemoryBackend), but every write
/// rewrites the file so fallback data survives a restart.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl JsonFileBackend {
    /// Open the file, starting empty when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let path = path.into();
        let tables = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tables::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(path = %path.display(), "Opened JSON fallback store");
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the tables, write the copy to disk and
    /// only then make it visible. A failed write leaves the store unchanged.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut Tables) -> Result<T, BackendError> + Send,
    ) -> Result<T, BackendError> {
        let mut tables = self.tables.write().await;
        let mut next = tables.clone();
        let value = change(&mut next)?;
        if next != *tables {
            self.persist(&next).await?;
            *tables = next;
        }
        Ok(value)
    }

    async fn persist(&self, tables: &Tables) -> Result<(), BackendError> {
        let bytes = serde_json::to_vec_pretty(tables)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for JsonFileBackend {
    fn backend_tag(&self) -> &'static str {
        "json-file"
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
        self.commit(|tables| {
            tables.put(collection, key, body);
            Ok(())
        })
        .await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, BackendError> {
        self.commit(|tables| Ok(tables.delete(collection, key))).await
    }

    async fn next_sequence(&self, collection: &str) -> Result<i64, BackendError> {
        self.commit(|tables| tables.next_sequence(collection)).await
    }

    async fn observe_sequence(&self, collection: &str, value: i64) -> Result<(), BackendError> {
        self.commit(|tables| {
            tables.observe_sequence(collection, value);
            Ok(())
        })
        .await
    }
}
