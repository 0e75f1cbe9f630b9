//! Club player.

use serde::{Deserialize, Serialize};

use super::optional_email;
use crate::entity::{EntityKind, ValidationError, require_text};
use crate::types::IdStrategy;

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub age: u32,
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl EntityKind for Player {
    const COLLECTION: &'static str = "players";
    const ID_STRATEGY: IdStrategy = IdStrategy::Prefixed("player");

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("team", &self.team)?;
        if !(3..=99).contains(&self.age) {
            return Err(ValidationError::invalid("age", "between 3 and 99"));
        }
        optional_email(self.email.as_deref())
    }
}
