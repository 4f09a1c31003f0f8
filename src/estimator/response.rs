// ABOUTME: Parsing and validation of raw estimator responses into meal analyses
// ABOUTME: Strips markdown fences, decodes camelCase JSON, and rejects bad numbers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tracing::error;

use crate::errors::EstimatorError;
use crate::llm::truncate_for_log;
use protein_core::models::{FoodItem, MealAnalysis};

/// Remove every "```json" and "```" marker and trim surrounding whitespace
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_owned()
}

/// Parse a raw estimator response into a validated `MealAnalysis`
///
/// # Errors
///
/// Returns [`EstimatorError::Parse`] when the text is not JSON, lacks a
/// required field, or carries a negative or non-finite number.
pub fn parse_meal_analysis(raw: &str) -> Result<MealAnalysis, EstimatorError> {
    let cleaned = strip_code_fences(raw);

    let analysis: MealAnalysis = serde_json::from_str(&cleaned).map_err(|e| {
        error!(error = %e, response = %truncate_for_log(&cleaned), "Estimator returned malformed JSON");
        EstimatorError::parse(format!("Estimator response is not a valid meal: {e}"))
    })?;

    validate(&analysis)?;
    Ok(analysis)
}

fn validate(analysis: &MealAnalysis) -> Result<(), EstimatorError> {
    for (index, item) in analysis.items.iter().enumerate() {
        validate_item(index, item)?;
    }

    for (field, value) in [
        ("totalProtein", analysis.total_protein),
        ("totalCalories", analysis.total_calories),
    ] {
        if let Some(value) = value {
            check_number(field, value)?;
        }
    }
    Ok(())
}

fn validate_item(index: usize, item: &FoodItem) -> Result<(), EstimatorError> {
    [
        ("quantity", item.quantity),
        ("baseProtein", item.base_protein),
        ("baseCalories", item.base_calories),
    ]
    .into_iter()
    .try_for_each(|(field, value)| {
        check_number(field, value)
            .map_err(|e| EstimatorError::parse(format!("item {index} ({}): {e}", item.name)))
    })
}

fn check_number(field: &str, value: f64) -> Result<(), EstimatorError> {
    if !value.is_finite() {
        return Err(EstimatorError::parse(format!("{field} is not a finite number")));
    }
    if value < 0.0 {
        return Err(EstimatorError::parse(format!("{field} is negative ({value})")));
    }
    Ok(())
}
