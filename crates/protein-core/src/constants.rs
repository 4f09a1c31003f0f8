// ABOUTME: Named constants for the unit model and ledger defaults
// ABOUTME: Eliminates magic numbers and strings shared across crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Unit model constants
pub mod units {
    /// Substring marking a bulk-by-weight unit
    pub const BULK_WEIGHT_MARKER: &str = "100g";

    /// Substring marking a bulk-by-volume unit
    pub const BULK_VOLUME_MARKER: &str = "100ml";

    /// Display suffix for bulk-by-weight units
    pub const WEIGHT_SUFFIX: &str = "g";

    /// Display suffix for bulk-by-volume units
    pub const VOLUME_SUFFIX: &str = "ml";

    /// Grams (or millilitres) represented by one canonical bulk unit
    pub const BULK_SCALE: f64 = 100.0;

    /// Input step for bulk quantities, in displayed grams/millilitres
    pub const BULK_INPUT_STEP: f64 = 10.0;

    /// Input step for discrete quantities, in canonical units
    pub const DISCRETE_INPUT_STEP: f64 = 0.5;
}

/// Defaults for a user-entered item the estimator did not detect
pub mod placeholder_item {
    /// Name given to a freshly added item
    pub const NAME: &str = "New Food";

    /// Unit given to a freshly added item
    pub const UNIT: &str = "1 serving";

    /// Quantity given to a freshly added item
    pub const QUANTITY: f64 = 1.0;
}

/// Defaults applied when the estimator omits advisory fields
pub mod analysis {
    /// Meal name used when the estimator does not report one
    pub const DEFAULT_MEAL_NAME: &str = "Meal";
}
