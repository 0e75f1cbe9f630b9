//! Singleton content store.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use oeiras_core::ContentKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::backend::DocumentBackend;
use super::{Backends, Degraded, Served, StoreError};

const COLLECTION: &str = "content";

/// Stored content plus its last edit time (`None` for built-in defaults).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord<C> {
    #[serde(flatten)]
    pub content: C,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<C: Default> Default for ContentRecord<C> {
    fn default() -> Self {
        Self {
            content: C::default(),
            updated_at: None,
        }
    }
}

/// Get/put for one content area. `get` never comes back empty: with nothing
/// stored anywhere it serves `C::default()`.
pub struct ContentStore<C> {
    backends: Backends,
    _kind: PhantomData<fn() -> C>,
}

impl<C> Clone for ContentStore<C> {
    fn clone(&self) -> Self {
        Self {
            backends: self.backends.clone(),
            _kind: PhantomData,
        }
    }
}

impl<C: ContentKind> ContentStore<C> {
    #[must_use]
    pub const fn new(backends: Backends) -> Self {
        Self {
            backends,
            _kind: PhantomData,
        }
    }

    /// The current content.
    ///
    /// # Errors
    ///
    /// Returns `Err(Degraded)` with the fallback copy (or the defaults) when
    /// the primary cannot be read.
    #[instrument(skip(self), fields(key = C::KEY))]
    pub async fn get(&self) -> Served<ContentRecord<C>> {
        match self.backends.primary.get(COLLECTION, C::KEY).await {
            Ok(Some(doc)) => Ok(decode(doc).unwrap_or_else(ContentRecord::default)),
            Ok(None) => Ok(self.fallback_copy().await),
            Err(cause) => {
                tracing::warn!(
                    key = C::KEY,
                    primary = self.backends.primary.backend_tag(),
                    error = %cause,
                    "Content read failed, serving fallback copy"
                );
                Err(Degraded {
                    value: self.fallback_copy().await,
                    cause,
                })
            }
        }
    }

    /// Validate, timestamp and store new content.
    ///
    /// The outer error is a hard failure. The inner `Err(Degraded)` means the
    /// primary write failed but the fallback copy now holds the edit, so later
    /// `get` calls in this process serve it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for a blank field, or
    /// `StoreError::BackendUnavailable` when both backends refuse the write.
    #[instrument(skip(self, content), fields(key = C::KEY))]
    pub async fn put(&self, content: C) -> Result<Served<ContentRecord<C>>, StoreError> {
        content.validate()?;
        let record = ContentRecord {
            content,
            updated_at: Some(Utc::now()),
        };
        let body = serde_json::to_value(&record)?;

        match self.backends.primary.put(COLLECTION, C::KEY, &body).await {
            Ok(()) => {
                tracing::info!(key = C::KEY, "Content updated");
                Ok(Ok(record))
            }
            Err(primary) => {
                tracing::warn!(key = C::KEY, error = %primary, "Content write failed, keeping edit in fallback");
                match self.backends.fallback.put(COLLECTION, C::KEY, &body).await {
                    Ok(()) => Ok(Err(Degraded {
                        value: record,
                        cause: primary,
                    })),
                    Err(fallback) => Err(StoreError::BackendUnavailable { primary, fallback }),
                }
            }
        }
    }

    async fn fallback_copy(&self) -> ContentRecord<C> {
        let fallback: &dyn DocumentBackend = self.backends.fallback.as_ref();
        match fallback.get(COLLECTION, C::KEY).await {
            Ok(Some(doc)) => decode(doc).unwrap_or_default(),
            Ok(None) => ContentRecord::default(),
            Err(e) => {
                tracing::error!(key = C::KEY, error = %e, "Fallback content read failed, serving defaults");
                ContentRecord::default()
            }
        }
    }
}

fn decode<C: ContentKind>(doc: Value) -> Option<ContentRecord<C>> {
    serde_json::from_value(doc)
        .inspect_err(|e| tracing::warn!(key = C::KEY, error = %e, "Corrupt content document"))
        .ok()
}
