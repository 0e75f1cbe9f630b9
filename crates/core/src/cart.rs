//! Session cart state machine.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s, at most one per product,
//! in first-added order. The four mutations below are the only transitions;
//! totals are folds over the current items and never cached.
//!
//! Line items snapshot the product's name, price and image at the moment
//! they are added. Later catalog edits do not re-price an open cart.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::Product;
use crate::entity::Record;
use crate::types::{EntityId, Price};

/// Cart operation failures. Only `add` and `update_quantity` can fail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("product {0} not found")]
    ProductNotFound(EntityId),

    #[error("item {0} not found in cart")]
    ItemNotFound(EntityId),

    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// One product-quantity pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: EntityId,
    pub name: String,
    pub unit_price: Price,
    pub image: String,
    pub quantity: u32,
}

impl LineItem {
    /// `quantity × unit_price`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A per-session shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Current line items in first-added order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of a looked-up product.
    ///
    /// Increments the existing line for this product, or appends a new one
    /// capturing the product's current name, price and image.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` when `quantity` is zero.
    pub fn add_product(&mut self, product: &Record<Product>, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(item) = self.find_mut(&product.id) {
            item.quantity = item.quantity.saturating_add(quantity);
            return Ok(());
        }

        self.items.push(LineItem {
            product_id: product.id.clone(),
            name: product.fields.name.clone(),
            unit_price: product.fields.price,
            image: product.fields.image.clone(),
            quantity,
        });
        Ok(())
    }

    /// Add by id, resolving the product with the result of a catalog lookup.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` when `product` is `None`, and
    /// `CartError::InvalidQuantity` when `quantity` is zero.
    pub fn add(
        &mut self,
        product_id: &EntityId,
        product: Option<&Record<Product>>,
        quantity: u32,
    ) -> Result<(), CartError> {
        let product = product.ok_or_else(|| CartError::ProductNotFound(product_id.clone()))?;
        self.add_product(product, quantity)
    }

    /// Set the absolute quantity of an existing line; `<= 0` removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` when the cart has no line for `product_id`.
    pub fn update_quantity(&mut self, product_id: &EntityId, quantity: i64) -> Result<(), CartError> {
        let position = self
            .position(product_id)
            .ok_or_else(|| CartError::ItemNotFound(product_id.clone()))?;

        if quantity <= 0 {
            self.items.remove(position);
        } else if let Some(item) = self.items.get_mut(position) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        Ok(())
    }

    /// Remove a line. Returns whether anything was removed; absence is not an error.
    pub fn remove(&mut self, product_id: &EntityId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `quantity × unit_price` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    fn position(&self, product_id: &EntityId) -> Option<usize> {
        self.items.iter().position(|item| &item.product_id == product_id)
    }

    fn find_mut(&mut self, product_id: &EntityId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| &item.product_id == product_id)
    }
}
