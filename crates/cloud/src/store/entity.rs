//! Generic CRUD store for one entity kind.

use std::marker::PhantomData;

use oeiras_core::{EntityId, EntityKind, IdStrategy, Record};
use serde_json::Value;
use tracing::instrument;

use super::backend::{BackendError, DocumentBackend};
use super::{Backends, Degraded, Served, StoreError};

/// CRUD over the collection of `K`, primary first and fallback on failure.
pub struct EntityStore<K> {
    backends: Backends,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for EntityStore<K> {
    fn clone(&self) -> Self {
        Self {
            backends: self.backends.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> std::fmt::Debug for EntityStore<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &std::any::type_name::<K>())
            .field("backends", &self.backends)
            .finish()
    }
}

impl<K: EntityKind> EntityStore<K> {
    #[must_use]
    pub const fn new(backends: Backends) -> Self {
        Self {
            backends,
            _kind: PhantomData,
        }
    }

    fn primary(&self) -> &dyn DocumentBackend {
        self.backends.primary.as_ref()
    }

    fn fallback(&self) -> &dyn DocumentBackend {
        self.backends.fallback.as_ref()
    }

    /// Every record, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns `Err(Degraded)` holding the fallback's records (empty if the
    /// fallback fails too) when the primary cannot be read.
    #[instrument(skip(self), fields(collection = K::COLLECTION))]
    pub async fn get_all(&self) -> Served<Vec<Record<K>>> {
        match self.primary().scan(K::COLLECTION).await {
            Ok(docs) => Ok(Self::decode_all(docs)),
            Err(cause) => {
                self.warn_degraded("get_all", &cause);
                let value = match self.fallback().scan(K::COLLECTION).await {
                    Ok(docs) => Self::decode_all(docs),
                    Err(e) => {
                        tracing::error!(collection = K::COLLECTION, error = %e, "Fallback scan failed");
                        Vec::new()
                    }
                };
                Err(Degraded { value, cause })
            }
        }
    }

    /// One record, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `Err(Degraded)` with the fallback's answer when the primary
    /// cannot be read. A fallback failure reads as absent.
    #[instrument(skip(self), fields(collection = K::COLLECTION, id = %id))]
    pub async fn get_by_id(&self, id: &EntityId) -> Served<Option<Record<K>>> {
        let key = id.storage_key();
        match self.primary().get(K::COLLECTION, &key).await {
            Ok(doc) => Ok(doc.and_then(|d| Self::decode_logged(&key, d))),
            Err(cause) => {
                self.warn_degraded("get_by_id", &cause);
                let value = match self.fallback().get(K::COLLECTION, &key).await {
                    Ok(doc) => doc.and_then(|d| Self::decode_logged(&key, d)),
                    Err(e) => {
                        tracing::error!(collection = K::COLLECTION, error = %e, "Fallback get failed");
                        None
                    }
                };
                Err(Degraded { value, cause })
            }
        }
    }

    /// Allocate the id the next created record will get.
    ///
    /// Sequential kinds draw from the backend counter, so concurrent callers
    /// never receive the same id. Prefixed kinds get a fresh random key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::BackendUnavailable` when neither backend can
    /// advance the counter.
    #[instrument(skip(self), fields(collection = K::COLLECTION))]
    pub async fn next_id(&self) -> Result<EntityId, StoreError> {
        match K::ID_STRATEGY {
            IdStrategy::Prefixed(prefix) => Ok(EntityId::generate(prefix)),
            IdStrategy::Sequential => match self.primary().next_sequence(K::COLLECTION).await {
                Ok(n) => Ok(EntityId::Seq(n)),
                Err(primary) => {
                    self.warn_degraded("next_id", &primary);
                    self.fallback()
                        .next_sequence(K::COLLECTION)
                        .await
                        .map(EntityId::Seq)
                        .map_err(|fallback| StoreError::BackendUnavailable { primary, fallback })
                }
            },
        }
    }

    /// Validate and store a new record under a freshly allocated id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` before touching storage, or
    /// `StoreError::BackendUnavailable` when both backends fail.
    pub async fn create(&self, fields: K) -> Result<Record<K>, StoreError> {
        fields.validate()?;
        let id = self.next_id().await?;
        self.create_with_id(id, fields).await
    }

    /// Validate and store a new record under a caller-supplied id.
    ///
    /// An integer id also raises the collection counter, so `next_id` keeps
    /// returning ids above every stored one.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    #[instrument(skip(self, fields), fields(collection = K::COLLECTION, id = %id))]
    pub async fn create_with_id(&self, id: EntityId, fields: K) -> Result<Record<K>, StoreError> {
        fields.validate()?;
        let record = Record::new(id, fields);
        let body = serde_json::to_value(&record)?;

        match Self::write(self.primary(), &record.id, &body).await {
            Ok(()) => {}
            Err(primary) => {
                self.warn_degraded("create", &primary);
                Self::write(self.fallback(), &record.id, &body)
                    .await
                    .map_err(|fallback| StoreError::BackendUnavailable { primary, fallback })?;
            }
        }

        tracing::info!(collection = K::COLLECTION, id = %record.id, "Record created");
        Ok(record)
    }

    /// Replace every editable field of an existing record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` before touching storage,
    /// `StoreError::NotFound` when the record does not exist in the backend
    /// that answered, or `StoreError::BackendUnavailable` when both fail.
    #[instrument(skip(self, fields), fields(collection = K::COLLECTION, id = %id))]
    pub async fn update(&self, id: &EntityId, fields: K) -> Result<Record<K>, StoreError> {
        fields.validate()?;
        let key = id.storage_key();

        let (existing, primary_reachable) = match self.primary().get(K::COLLECTION, &key).await {
            Ok(doc) => (doc, true),
            Err(primary) => {
                self.warn_degraded("update", &primary);
                let doc = self
                    .fallback()
                    .get(K::COLLECTION, &key)
                    .await
                    .map_err(|fallback| StoreError::BackendUnavailable { primary, fallback })?;
                (doc, false)
            }
        };

        let existing = existing.ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let record = Self::decode(existing)?.replaced(fields);
        let body = serde_json::to_value(&record)?;

        if primary_reachable {
            if let Err(primary) = self.primary().put(K::COLLECTION, &key, &body).await {
                self.warn_degraded("update", &primary);
                self.fallback()
                    .put(K::COLLECTION, &key, &body)
                    .await
                    .map_err(|fallback| StoreError::BackendUnavailable { primary, fallback })?;
            }
        } else {
            self.fallback()
                .put(K::COLLECTION, &key, &body)
                .await
                .map_err(StoreError::Fallback)?;
        }

        tracing::info!(collection = K::COLLECTION, id = %id, "Record updated");
        Ok(record)
    }

    /// Delete a record. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when the primary is down and the
    /// fallback has no such record, or `StoreError::BackendUnavailable` when
    /// both backends fail.
    #[instrument(skip(self), fields(collection = K::COLLECTION, id = %id))]
    pub async fn delete(&self, id: &EntityId) -> Result<bool, StoreError> {
        let key = id.storage_key();
        match self.primary().delete(K::COLLECTION, &key).await {
            Ok(removed) => Ok(removed),
            Err(primary) => {
                self.warn_degraded("delete", &primary);
                match self.fallback().delete(K::COLLECTION, &key).await {
                    Ok(true) => Ok(true),
                    Ok(false) => Err(StoreError::NotFound(id.clone())),
                    Err(fallback) => Err(StoreError::BackendUnavailable { primary, fallback }),
                }
            }
        }
    }

    async fn write(
        backend: &dyn DocumentBackend,
        id: &EntityId,
        body: &Value,
    ) -> Result<(), BackendError> {
        backend.put(K::COLLECTION, &id.storage_key(), body).await?;
        if let EntityId::Seq(n) = id {
            backend.observe_sequence(K::COLLECTION, *n).await?;
        }
        Ok(())
    }

    fn decode(doc: Value) -> Result<Record<K>, serde_json::Error> {
        serde_json::from_value(doc)
    }

    fn decode_logged(key: &str, doc: Value) -> Option<Record<K>> {
        match Self::decode(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(collection = K::COLLECTION, key, error = %e, "Skipping corrupt document");
                None
            }
        }
    }

    fn decode_all(docs: Vec<(String, Value)>) -> Vec<Record<K>> {
        let mut records: Vec<Record<K>> = docs
            .into_iter()
            .filter_map(|(key, doc)| Self::decode_logged(&key, doc))
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    fn warn_degraded(&self, operation: &'static str, cause: &BackendError) {
        tracing::warn!(
            collection = K::COLLECTION,
            operation,
            primary = self.primary().backend_tag(),
            fallback = self.fallback().backend_tag(),
            error = %cause,
            "Primary store failed, using fallback"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use oeiras_core::{Player, Price, Product, ValidationError};

    use super::*;
    use crate::store::{DisconnectedBackend, MemoryBackend, served};

    fn product(name: &str) -> Product {
        Product {
            name: name.to_string(),
            price: Price::from_cents(2599),
            image: "/uploads/x.jpg".to_string(),
            images: vec![],
            description: String::new(),
            product_details: String::new(),
            category: None,
        }
    }

    fn player(name: &str) -> Player {
        Player {
            name: name.to_string(),
            age: 11,
            team: "Sub-12".to_string(),
            jersey_number: None,
            mobile: None,
            email: None,
        }
    }

    #[tokio::test]
    async fn test_next_id_starts_at_one_and_follows_max() {
        let store = EntityStore::<Product>::new(Backends::in_memory());
        assert_eq!(store.next_id().await.unwrap(), EntityId::Seq(1));

        store.create_with_id(EntityId::Seq(5), product("Vase")).await.unwrap();
        store.create_with_id(EntityId::Seq(2), product("Cup")).await.unwrap();
        assert_eq!(store.next_id().await.unwrap(), EntityId::Seq(6));
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = EntityStore::<Product>::new(Backends::in_memory());
        let a = store.create(product("Bowl")).await.unwrap();
        let b = store.create(product("Cup")).await.unwrap();
        assert_eq!(a.id, EntityId::Seq(1));
        assert_eq!(b.id, EntityId::Seq(2));
    }

    #[tokio::test]
    async fn test_prefixed_kind_gets_string_id() {
        let store = EntityStore::<Player>::new(Backends::in_memory());
        let record = store.create(player("Rui")).await.unwrap();
        assert!(record.id.to_string().starts_with("player_"));
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_none() {
        let store = EntityStore::<Product>::new(Backends::in_memory());
        assert!(store.get_by_id(&EntityId::Seq(999)).await.unwrap().is_none());

        let offline = EntityStore::<Product>::new(Backends::offline());
        let degraded = offline.get_by_id(&EntityId::Seq(999)).await.unwrap_err();
        assert!(degraded.value.is_none());
        assert!(matches!(degraded.cause, BackendError::NotConfigured));
    }

    #[tokio::test]
    async fn test_get_all_sorted_by_id() {
        let store = EntityStore::<Product>::new(Backends::in_memory());
        for id in [10, 2, 7] {
            store.create_with_id(EntityId::Seq(id), product("P")).await.unwrap();
        }
        let ids: Vec<_> = store.get_all().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![EntityId::Seq(2), EntityId::Seq(7), EntityId::Seq(10)]);
    }

    #[tokio::test]
    async fn test_offline_writes_land_in_fallback() {
        let store = EntityStore::<Product>::new(Backends::offline());

        let created = store.create(product("Bowl")).await.unwrap();
        assert_eq!(created.id, EntityId::Seq(1));

        let all = store.get_all().await.unwrap_err();
        assert_eq!(all.value.len(), 1);

        let updated = store.update(&created.id, product("Big Bowl")).await.unwrap();
        assert_eq!(updated.fields.name, "Big Bowl");
        assert_eq!(updated.created_at, created.created_at);

        let fetched = served(store.get_by_id(&created.id).await).unwrap();
        assert_eq!(fetched.fields.name, "Big Bowl");

        assert!(store.delete(&created.id).await.unwrap());
        assert!(matches!(
            store.delete(&created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_on_primary_is_false() {
        let store = EntityStore::<Product>::new(Backends::in_memory());
        assert!(!store.delete(&EntityId::Seq(3)).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = EntityStore::<Product>::new(Backends::in_memory());
        assert!(matches!(
            store.update(&EntityId::Seq(4), product("X")).await,
            Err(StoreError::NotFound(EntityId::Seq(4)))
        ));
    }

    #[tokio::test]
    async fn test_validation_happens_before_storage() {
        let store = EntityStore::<Product>::new(Backends::new(
            Arc::new(DisconnectedBackend),
            Arc::new(DisconnectedBackend),
        ));
        let err = store.create(product("")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::Required("name"))
        ));
    }

    #[tokio::test]
    async fn test_both_backends_down_surfaces_error() {
        let store = EntityStore::<Player>::new(Backends::new(
            Arc::new(DisconnectedBackend),
            Arc::new(DisconnectedBackend),
        ));
        assert!(matches!(
            store.create(player("Rui")).await,
            Err(StoreError::BackendUnavailable { .. })
        ));
        assert!(store.get_all().await.unwrap_err().value.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_documents_are_skipped() {
        let primary = Arc::new(MemoryBackend::new());
        primary
            .put("products", "99", &serde_json::json!({"unexpected": true}))
            .await
            .unwrap();
        let store = EntityStore::<Product>::new(Backends::new(primary, Arc::new(MemoryBackend::new())));
        store.create(product("Bowl")).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.first().unwrap().fields.name, "Bowl");
    }
}
