//! Club coach.

use serde::{Deserialize, Serialize};

use super::optional_email;
use crate::entity::{EntityKind, ValidationError, require_text};
use crate::types::IdStrategy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub name: String,
    pub team: String,
    /// Head coach, assistant, goalkeeper coach...
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl EntityKind for Coach {
    const COLLECTION: &'static str = "coaches";
    const ID_STRATEGY: IdStrategy = IdStrategy::Prefixed("coach");

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("team", &self.team)?;
        optional_email(self.email.as_deref())
    }
}
