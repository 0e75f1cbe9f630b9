//! Record identifiers.
//!
//! Catalog products are addressed by a monotonic integer (`/product/7`),
//! while club records carry a generated string key (`player_1718000000000_…`).
//! [`EntityId`] covers both so a single store implementation serves every kind.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a kind obtains ids for new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// Integer ids allocated from the backend's per-collection counter.
    Sequential,
    /// String ids of the form `<prefix>_<unix-millis>_<random>`.
    Prefixed(&'static str),
}

/// Identifier of a stored record.
///
/// Serializes untagged, so JSON carries either `7` or `"player_…"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Integer id (storefront products).
    Seq(i64),
    /// Generated string id (admin entities).
    Key(String),
}

impl EntityId {
    /// Generate a fresh string id for the given prefix.
    ///
    /// The random tail is a v4 UUID, so concurrent writers never collide.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let random = uuid::Uuid::new_v4().simple().to_string();
        Self::Key(format!("{prefix}_{millis}_{random}"))
    }

    /// Get the integer value, if this is a sequential id.
    #[must_use]
    pub const fn as_seq(&self) -> Option<i64> {
        match self {
            Self::Seq(n) => Some(*n),
            Self::Key(_) => None,
        }
    }

    /// The document key used by storage backends.
    #[must_use]
    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seq(n) => write!(f, "{n}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    /// Parse a path segment: all-digit input becomes [`EntityId::Seq`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Key(trimmed.to_owned()), Self::Seq))
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Seq(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::Key(id.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_has_prefix_and_three_parts() {
        let EntityId::Key(key) = EntityId::generate("player") else {
            panic!("expected string id");
        };
        let parts: Vec<&str> = key.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.first().copied(), Some("player"));
        assert!(parts.get(1).unwrap().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(EntityId::generate("coach"), EntityId::generate("coach"));
    }

    #[test]
    fn test_parse_digits_as_seq() {
        assert_eq!("42".parse::<EntityId>().unwrap(), EntityId::Seq(42));
        assert_eq!(
            "coach_1_abc".parse::<EntityId>().unwrap(),
            EntityId::Key("coach_1_abc".to_string())
        );
    }

    #[test]
    fn test_untagged_json() {
        assert_eq!(serde_json::to_string(&EntityId::Seq(5)).unwrap(), "5");
        let parsed: EntityId = serde_json::from_str("\"player_1_x\"").unwrap();
        assert_eq!(parsed, EntityId::Key("player_1_x".to_string()));
        let parsed: EntityId = serde_json::from_str("12").unwrap();
        assert_eq!(parsed, EntityId::Seq(12));
    }

    #[test]
    fn test_ordering_sequential_is_numeric() {
        let mut ids = vec![EntityId::Seq(10), EntityId::Seq(2), EntityId::Seq(7)];
        ids.sort();
        assert_eq!(ids, vec![EntityId::Seq(2), EntityId::Seq(7), EntityId::Seq(10)]);
    }
}
