// ABOUTME: In-memory ordered ledger of food items with derived macro totals
// ABOUTME: Supports replace-all, typed field updates, removal, and appends by id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Item Ledger
//!
//! The ledger holds the current meal's items in canonical units. Each item
//! receives a fresh [`ItemId`] when it enters the ledger; `replace_all`
//! discards every existing id. Totals are never stored, so they cannot drift
//! from the items they summarize.
//!
//! Numeric updates are clamped at zero. Non-finite values are rejected.

mod view;

pub use view::{ItemView, MealTotals};

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, ErrorCode};
use protein_core::models::FoodItem;

/// Process-local identifier of a ledger item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh id
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// A food item together with its ledger id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerItem {
    /// Identifier, unique within this ledger
    pub id: ItemId,
    /// Item data in canonical units
    #[serde(flatten)]
    pub item: FoodItem,
}

/// A single-field edit of a ledger item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemUpdate {
    /// Replace the name
    Name(String),
    /// Replace the unit descriptor
    Unit(String),
    /// Replace the canonical quantity
    Quantity(f64),
    /// Replace protein grams per canonical unit
    BaseProtein(f64),
    /// Replace kilocalories per canonical unit
    BaseCalories(f64),
}

impl ItemUpdate {
    fn apply(self, item: &mut FoodItem) -> Result<(), LedgerError> {
        match self {
            Self::Name(name) => item.name = name,
            Self::Unit(unit) => item.unit = unit,
            Self::Quantity(value) => item.quantity = non_negative("quantity", value)?,
            Self::BaseProtein(value) => item.base_protein = non_negative("baseProtein", value)?,
            Self::BaseCalories(value) => item.base_calories = non_negative("baseCalories", value)?,
        }
        Ok(())
    }
}

/// Clamp negatives to zero and reject NaN or infinity
fn non_negative(field: &'static str, value: f64) -> Result<f64, LedgerError> {
    if value.is_finite() {
        Ok(value.max(0.0))
    } else {
        Err(LedgerError::NonFinite { field, value })
    }
}

/// Ledger update failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// A numeric field was given NaN or infinity
    #[error("{field} must be a finite number, got {value}")]
    NonFinite {
        /// Field being updated
        field: &'static str,
        /// Rejected value
        value: f64,
    },
}

impl From<LedgerError> for AppError {
    fn from(error: LedgerError) -> Self {
        Self::new(ErrorCode::ValueOutOfRange, error.to_string())
    }
}

/// Ordered collection of the current meal's items
#[derive(Debug, Default, Clone)]
pub struct ItemLedger {
    items: Vec<LedgerItem>,
    generation: u64,
}

impl ItemLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all items and ingest `items` in order with fresh ids
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = FoodItem>) {
        self.items = items
            .into_iter()
            .map(|item| LedgerItem {
                id: ItemId::generate(),
                item,
            })
            .collect();
        self.generation += 1;

        info!(
            generation = self.generation,
            items = self.items.len(),
            "Replaced ledger items"
        );
    }

    /// Apply a single-field edit
    ///
    /// Returns `Ok(false)` when `id` is not in the ledger; nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonFinite`] for NaN or infinite numbers; the
    /// item is left untouched.
    pub fn update(&mut self, id: ItemId, update: ItemUpdate) -> Result<bool, LedgerError> {
        let Some(entry) = self.items.iter_mut().find(|entry| entry.id == id) else {
            return Ok(false);
        };
        update.apply(&mut entry.item)?;
        Ok(true)
    }

    /// Remove an item, returning it if it was present
    pub fn remove(&mut self, id: ItemId) -> Option<FoodItem> {
        let index = self.items.iter().position(|entry| entry.id == id)?;
        Some(self.items.remove(index).item)
    }

    /// Append an item with a fresh id
    ///
    /// Negative numbers are clamped to zero.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonFinite`] if any numeric field is NaN or infinite.
    pub fn add(&mut self, item: FoodItem) -> Result<ItemId, LedgerError> {
        let item = FoodItem {
            quantity: non_negative("quantity", item.quantity)?,
            base_protein: non_negative("baseProtein", item.base_protein)?,
            base_calories: non_negative("baseCalories", item.base_calories)?,
            ..item
        };
        let id = ItemId::generate();
        self.items.push(LedgerItem { id, item });
        Ok(id)
    }

    /// Append the default item for something the estimator missed
    pub fn add_placeholder(&mut self) -> ItemId {
        let id = ItemId::generate();
        self.items.push(LedgerItem {
            id,
            item: FoodItem::placeholder(),
        });
        id
    }

    /// Sum of protein and calories over the current items
    #[must_use]
    pub fn totals(&self) -> MealTotals {
        self.items
            .iter()
            .fold(MealTotals::default(), |totals, entry| MealTotals {
                protein: totals.protein + entry.item.protein(),
                calories: totals.calories + entry.item.calories(),
            })
    }

    /// `"{quantity}x {name}"` for every item, in order
    #[must_use]
    pub fn recalculation_queries(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|entry| entry.item.recalculation_query())
            .collect()
    }

    /// Number of `replace_all` calls so far
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Look up an item
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&FoodItem> {
        self.items
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.item)
    }

    /// Items in order
    #[must_use]
    pub fn items(&self) -> &[LedgerItem] {
        &self.items
    }

    /// Ids in order
    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|entry| entry.id).collect()
    }

    /// Display rows for every item, in order
    #[must_use]
    pub fn views(&self) -> Vec<ItemView> {
        self.items.iter().map(ItemView::from_entry).collect()
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the ledger has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative_clamps_and_rejects() {
        assert_eq!(non_negative("quantity", -2.0), Ok(0.0));
        assert_eq!(non_negative("quantity", 1.5), Ok(1.5));
        assert!(matches!(
            non_negative("quantity", f64::NAN),
            Err(LedgerError::NonFinite { field: "quantity", .. })
        ));
    }
}
