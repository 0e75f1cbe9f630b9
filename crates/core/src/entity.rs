//! Generic entity-kind model.
//!
//! Every stored record kind (product, player, coach, coordinator) is a flat
//! struct of editable fields implementing [`EntityKind`]. The store wraps it
//! in a [`Record`] that adds the id and timestamps, so CRUD logic is written
//! once and parameterised over the kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::types::{EntityId, IdStrategy};

/// Input rejected before any store is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// A field is present but has the wrong shape.
    #[error("{field} must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },

    /// Free-form rejection (uploads, form structure).
    #[error("{0}")]
    Other(String),
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Invalid`].
    #[must_use]
    pub const fn invalid(field: &'static str, expected: &'static str) -> Self {
        Self::Invalid { field, expected }
    }
}

/// Require a non-blank text field.
///
/// # Errors
///
/// Returns `ValidationError::Required` when `value` is empty after trimming.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// A record kind persisted in its own collection.
pub trait EntityKind:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static
{
    /// Collection (table) name.
    const COLLECTION: &'static str;

    /// How new ids are assigned.
    const ID_STRATEGY: IdStrategy;

    /// Check the editable fields.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A stored record: id, the kind's fields and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<K> {
    pub id: EntityId,
    #[serde(flatten)]
    pub fields: K,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<K: EntityKind> Record<K> {
    /// Build a freshly created record.
    #[must_use]
    pub fn new(id: EntityId, fields: K) -> Self {
        Self {
            id,
            fields,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Full-replace the editable fields, keeping id and creation time.
    #[must_use]
    pub fn replaced(self, fields: K) -> Self {
        Self {
            id: self.id,
            fields,
            created_at: self.created_at,
            updated_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::Player;

    fn player(name: &str) -> Player {
        Player {
            name: name.to_string(),
            age: 12,
            team: "Sub-13".to_string(),
            jersey_number: Some(9),
            mobile: None,
            email: None,
        }
    }

    #[test]
    fn test_record_json_is_flat_camel_case() {
        let record = Record::new(EntityId::Key("player_1_a".to_string()), player("Rui"));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], "player_1_a");
        assert_eq!(json["name"], "Rui");
        assert_eq!(json["jerseyNumber"], 9);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_none());

        let back: Record<Player> = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_replaced_keeps_identity() {
        let record = Record::new(EntityId::Seq(3), player("Rui"));
        let created_at = record.created_at;
        let updated = record.replaced(player("Tiago"));

        assert_eq!(updated.id, EntityId::Seq(3));
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.fields.name, "Tiago");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("name", "Bowl").is_ok());
        assert_eq!(
            require_text("name", "  "),
            Err(ValidationError::Required("name"))
        );
    }
}
