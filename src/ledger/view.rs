// ABOUTME: Display projections of ledger items and meal totals
// ABOUTME: Applies the unit model so bulk items show grams and discrete items show counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use super::{ItemId, LedgerItem};
use protein_core::units::UnitKind;

/// Aggregate protein and calories of a ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MealTotals {
    /// Protein grams
    pub protein: f64,
    /// Kilocalories
    pub calories: f64,
}

impl MealTotals {
    /// Protein with one decimal place
    #[must_use]
    pub fn protein_label(&self) -> String {
        format!("{:.1}", self.protein)
    }

    /// Calories rounded to a whole number
    #[must_use]
    pub fn calories_label(&self) -> String {
        format!("{}", self.calories.round())
    }
}

impl Display for MealTotals {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} Cal, {}g protein",
            self.calories_label(),
            self.protein_label()
        )
    }
}

/// One ledger row as presented to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    /// Ledger id for edits
    pub id: ItemId,
    /// Item name
    pub name: String,
    /// Raw unit descriptor
    pub unit: String,
    /// Unit classification
    pub unit_kind: UnitKind,
    /// Quantity in display units (grams for "100g" items)
    pub display_value: f64,
    /// Display value as rendered in the input
    pub display_text: String,
    /// Label next to the input ("g", "ml", "large egg")
    pub suffix: String,
    /// Input increment in display units
    pub step: f64,
    /// Protein grams per canonical unit
    pub base_protein: f64,
    /// Kilocalories per canonical unit
    pub base_calories: f64,
    /// Protein grams for this item
    pub protein: f64,
    /// Kilocalories for this item
    pub calories: f64,
}

impl ItemView {
    pub(super) fn from_entry(entry: &LedgerItem) -> Self {
        let item = &entry.item;
        let kind = item.unit_kind();
        Self {
            id: entry.id,
            name: item.name.clone(),
            unit: item.unit.clone(),
            unit_kind: kind,
            display_value: kind.display_from_canonical(item.quantity),
            display_text: kind.render_display_value(item.quantity),
            suffix: kind.display_suffix(&item.unit).to_owned(),
            step: kind.input_step(),
            base_protein: item.base_protein,
            base_calories: item.base_calories,
            protein: item.protein(),
            calories: item.calories(),
        }
    }

    /// Per-item protein, e.g. `"4.1g"`
    #[must_use]
    pub fn protein_label(&self) -> String {
        format!("{:.1}g", self.protein)
    }

    /// Per-item calories, e.g. `"195 Cal"`
    #[must_use]
    pub fn calories_label(&self) -> String {
        format!("{} Cal", self.calories.round())
    }

    /// Estimator's per-unit protein basis
    #[must_use]
    pub fn base_label(&self) -> String {
        format!("AI Base: {}g P per {}", self.base_protein, self.unit)
    }
}
