//! Club coordinator.

use serde::{Deserialize, Serialize};

use super::optional_email;
use crate::entity::{EntityKind, ValidationError, require_text};
use crate::types::IdStrategy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinator {
    pub name: String,
    /// Age group or department coordinated.
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl EntityKind for Coordinator {
    const COLLECTION: &'static str = "coordinators";
    const ID_STRATEGY: IdStrategy = IdStrategy::Prefixed("coordinator");

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("area", &self.area)?;
        optional_email(self.email.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_required() {
        let coordinator = Coordinator {
            name: "Ana".to_string(),
            area: String::new(),
            mobile: None,
            email: None,
        };
        assert_eq!(coordinator.validate(), Err(ValidationError::Required("area")));
    }
}
