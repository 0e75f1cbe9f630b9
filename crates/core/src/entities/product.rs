//! Catalog product.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, ValidationError, require_text};
use crate::types::{IdStrategy, Price};

/// A ceramic piece listed in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub price: Price,
    /// Primary image URL (the first of `images`).
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product_details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Product {
    /// Every non-blank image URL, falling back to the primary image for
    /// legacy records.
    #[must_use]
    pub fn gallery(&self) -> Vec<&str> {
        let images: Vec<&str> = self
            .images
            .iter()
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
            .collect();
        if !images.is_empty() {
            return images;
        }
        if self.image.trim().is_empty() { vec![] } else { vec![self.image.as_str()] }
    }

    /// Whether this product belongs to `category` (case-insensitive).
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(category))
    }
}

impl EntityKind for Product {
    const COLLECTION: &'static str = "products";
    const ID_STRATEGY: IdStrategy = IdStrategy::Sequential;

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        self.price.ensure_positive()?;
        require_text("image", &self.image)?;
        Ok(())
    }
}
