//! Item domain model.
//!
//! # Responsibility
//! - Define the canonical inventory record persisted in the `items` table.
//! - Own field-level validation invoked by every repository write path.
//!
//! # Invariants
//! - `id` is caller-assigned, unique, and never reused for another item.
//! - Price is stored in minor currency units; never a float.
//! - A validated item has a non-empty trimmed name and non-negative
//!   price/quantity.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable integer identifier for an inventory item.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ItemId = i64;

/// Validation failure for an [`Item`] write candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemValidationError {
    /// `id` must be a positive integer.
    NonPositiveId(ItemId),
    /// `name` must contain at least one non-whitespace character.
    EmptyName,
    /// `price_cents` must not be negative.
    NegativePrice(i64),
    /// `quantity` must not be negative.
    NegativeQuantity(i64),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "item id must be positive, got {id}"),
            Self::EmptyName => write!(f, "item name must not be empty"),
            Self::NegativePrice(cents) => {
                write!(f, "item price must not be negative, got {cents}")
            }
            Self::NegativeQuantity(quantity) => {
                write!(f, "item quantity must not be negative, got {quantity}")
            }
        }
    }
}

impl Error for ItemValidationError {}

/// Canonical inventory record.
///
/// The storage engine owns the durable copy; values of this type are
/// transient in-memory copies passed by value into each operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Caller-assigned stable primary key.
    pub id: ItemId,
    /// Display name; also the sort key for list queries.
    pub name: String,
    /// Unit price in minor currency units (cents).
    pub price_cents: i64,
    /// Units currently in stock.
    pub quantity: i64,
}

impl Item {
    /// Creates a validated item.
    ///
    /// # Errors
    /// - Returns the first violated field constraint.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        price_cents: i64,
        quantity: i64,
    ) -> Result<Self, ItemValidationError> {
        let item = Self {
            id,
            name: name.into(),
            price_cents,
            quantity,
        };
        item.validate()?;
        Ok(item)
    }

    /// Checks field constraints for persistence.
    ///
    /// Repository write paths call this before issuing SQL, and read paths
    /// call it to reject invalid persisted state.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id <= 0 {
            return Err(ItemValidationError::NonPositiveId(self.id));
        }
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if self.price_cents < 0 {
            return Err(ItemValidationError::NegativePrice(self.price_cents));
        }
        if self.quantity < 0 {
            return Err(ItemValidationError::NegativeQuantity(self.quantity));
        }
        Ok(())
    }

    /// Returns the stock value of this item in minor units.
    pub fn total_price_cents(&self) -> i64 {
        self.price_cents.saturating_mul(self.quantity)
    }

    /// Renders the unit price as a decimal string, e.g. `"12.99"`.
    pub fn display_price(&self) -> String {
        format!("{}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }

    /// Returns whether the item is currently out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}
