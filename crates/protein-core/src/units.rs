// ABOUTME: Unit model classifying free-text food units as bulk or discrete
// ABOUTME: Provides display-to-canonical scaling so "150g" edits store 1.5 units
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unit Model
//!
//! The estimator describes each item with a free-text unit. The only units the
//! system interprets are bulk ones: any unit containing `"100g"` is measured
//! by weight, any containing `"100ml"` by volume, and everything else is a
//! discrete count. Classification is a plain substring test and is the single
//! place this fuzzy behavior lives.
//!
//! Bulk quantities are shown to the user in grams or millilitres (canonical
//! quantity x 100) and divided back on edit. Discrete quantities are shown
//! unchanged.
//!
//! A unit containing both markers is classified by weight.

use serde::{Deserialize, Serialize};

use crate::constants::units::{
    BULK_INPUT_STEP, BULK_SCALE, BULK_VOLUME_MARKER, BULK_WEIGHT_MARKER, DISCRETE_INPUT_STEP,
    VOLUME_SUFFIX, WEIGHT_SUFFIX,
};

/// Classification of a unit descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Measured per 100 grams
    BulkByWeight,
    /// Measured per 100 millilitres
    BulkByVolume,
    /// Counted in natural units (slices, eggs, cups)
    Discrete,
}

impl UnitKind {
    /// Classify a unit descriptor by substring
    #[must_use]
    pub fn classify(unit: &str) -> Self {
        if unit.contains(BULK_WEIGHT_MARKER) {
            Self::BulkByWeight
        } else if unit.contains(BULK_VOLUME_MARKER) {
            Self::BulkByVolume
        } else {
            Self::Discrete
        }
    }

    /// Whether quantities are displayed scaled by 100
    #[must_use]
    pub const fn is_bulk(&self) -> bool {
        matches!(self, Self::BulkByWeight | Self::BulkByVolume)
    }

    /// Label shown next to the quantity input
    ///
    /// Bulk units show `g` or `ml`; discrete units show their own text with a
    /// leading `"1 "` token removed ("1 large egg" becomes "large egg").
    #[must_use]
    pub fn display_suffix<'a>(&self, unit: &'a str) -> &'a str {
        match self {
            Self::BulkByWeight => WEIGHT_SUFFIX,
            Self::BulkByVolume => VOLUME_SUFFIX,
            Self::Discrete => strip_leading_one(unit),
        }
    }

    /// Increment used by the quantity input, in displayed units
    #[must_use]
    pub const fn input_step(&self) -> f64 {
        if self.is_bulk() {
            BULK_INPUT_STEP
        } else {
            DISCRETE_INPUT_STEP
        }
    }

    /// Convert a canonical quantity to the value shown to the user
    #[must_use]
    pub fn display_from_canonical(&self, quantity: f64) -> f64 {
        if self.is_bulk() {
            quantity * BULK_SCALE
        } else {
            quantity
        }
    }

    /// Convert a user-entered value back to a canonical quantity
    #[must_use]
    pub fn canonical_from_display(&self, displayed: f64) -> f64 {
        if self.is_bulk() {
            displayed / BULK_SCALE
        } else {
            displayed
        }
    }

    /// Render a canonical quantity for display
    ///
    /// Bulk values are rounded to whole grams/millilitres. Discrete values keep
    /// their fraction, without a trailing `.0` on whole numbers.
    #[must_use]
    pub fn render_display_value(&self, quantity: f64) -> String {
        let displayed = self.display_from_canonical(quantity);
        if self.is_bulk() {
            format!("{}", displayed.round())
        } else {
            format!("{displayed}")
        }
    }
}

/// Remove a leading "1" followed by whitespace from a unit descriptor
fn strip_leading_one(unit: &str) -> &str {
    unit.strip_prefix('1')
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map_or(unit, str::trim_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_leading_one_requires_whitespace() {
        assert_eq!(strip_leading_one("1 large egg"), "large egg");
        assert_eq!(strip_leading_one("1  slice"), "slice");
        assert_eq!(strip_leading_one("10 almonds"), "10 almonds");
        assert_eq!(strip_leading_one("slice"), "slice");
        assert_eq!(strip_leading_one("1"), "1");
    }
}
