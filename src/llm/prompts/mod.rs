// ABOUTME: Prompts for the meal estimator loaded at compile time
// ABOUTME: Builds the image-analysis and item-recalculation user messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Estimator Prompts
//!
//! The nutritionist policy (natural unit rule, cooked-state calibration,
//! quantity default, JSON-only output) is sent as the system instruction for
//! both operations. It is loaded at compile time from a markdown file for easy
//! maintenance. The user message differs per operation.

/// Nutritionist policy shared by analysis and recalculation
pub const MEAL_ESTIMATOR_SYSTEM_PROMPT: &str = include_str!("meal_estimator.md");

/// Get the system prompt for the meal estimator
#[must_use]
pub const fn get_meal_estimator_system_prompt() -> &'static str {
    MEAL_ESTIMATOR_SYSTEM_PROMPT
}

/// User message accompanying a meal photo
///
/// The context line is omitted when no context was supplied.
#[must_use]
pub fn analysis_prompt(context: Option<&str>) -> String {
    match context {
        Some(context) => format!("Analyze this food image. USER CONTEXT: \"{context}\""),
        None => "Analyze this food image.".to_owned(),
    }
}

/// User message carrying a corrected list of item queries
///
/// Queries are embedded as a JSON array of strings, one per item, in order.
#[must_use]
pub fn recalculation_prompt(queries: &[String]) -> String {
    let list = serde_json::to_string(queries).unwrap_or_else(|_| format!("{queries:?}"));
    format!(
        "The user has corrected a list of food items they ate.\n\n\
         Here is the exact list of items:\n{list}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_context_line() {
        assert_eq!(analysis_prompt(None), "Analyze this food image.");
        assert_eq!(
            analysis_prompt(Some("2 eggs")),
            "Analyze this food image. USER CONTEXT: \"2 eggs\""
        );
    }

    #[test]
    fn test_recalculation_prompt_embeds_json_list() {
        let prompt = recalculation_prompt(&["2x egg".to_owned(), "1.5x \"dal\"".to_owned()]);
        assert!(prompt.ends_with(r#"["2x egg","1.5x \"dal\""]"#));
    }

    #[test]
    fn test_system_prompt_demands_bulk_unit() {
        assert!(MEAL_ESTIMATOR_SYSTEM_PROMPT.contains("You MUST use exactly \"100g\""));
        assert!(MEAL_ESTIMATOR_SYSTEM_PROMPT.contains("Return ONLY a JSON object"));
    }
}
