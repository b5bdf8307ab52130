//! Items and line items.
//!
//! An [`Item`] is an immutable value snapshot copied from the catalog at the
//! moment of insertion. The collection engine never refreshes it: if the
//! catalog price changes after an item was added, lines already in a
//! collection keep the price they were added at. This matches what shoppers
//! saw when they put the item in the basket and keeps totals stable.

use serde::{Deserialize, Serialize};

use crate::types::{ItemId, Price};

/// A purchasable entity as snapshotted from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier, unique within a collection.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Price per unit at the time the snapshot was taken.
    pub unit_price: Price,
    /// Reference to a product image, if the catalog provided one.
    pub image_ref: Option<String>,
    /// Catalog category, if any.
    pub category: Option<String>,
    /// Upper bound on quantity; `None` means unbounded.
    pub stock_limit: Option<u32>,
}

impl Item {
    /// Create an item with no image, category, or stock limit.
    #[must_use]
    pub const fn new(id: ItemId, name: String, unit_price: Price) -> Self {
        Self {
            id,
            name,
            unit_price,
            image_ref: None,
            category: None,
            stock_limit: None,
        }
    }

    /// Set the stock limit.
    #[must_use]
    pub const fn with_stock_limit(mut self, limit: u32) -> Self {
        self.stock_limit = Some(limit);
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the image reference.
    #[must_use]
    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// An item plus a quantity within a collection.
///
/// Invariant: `quantity >= 1`. A line whose quantity would drop to zero is
/// removed from the collection instead of being stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item: Item,
    pub quantity: u32,
}

impl LineItem {
    /// Total price for this line (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::new(
            self.item.unit_price.amount * rust_decimal::Decimal::from(self.quantity),
            self.item.unit_price.currency_code,
        )
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::CurrencyCode;

    #[test]
    fn line_total_multiplies_unit_price() {
        let item = Item::new(
            ItemId::new(1),
            "Widget".to_string(),
            Price::new(Decimal::new(1099, 2), CurrencyCode::USD),
        );
        let line = LineItem { item, quantity: 3 };
        assert_eq!(line.line_total().amount, Decimal::new(3297, 2));
    }
}
