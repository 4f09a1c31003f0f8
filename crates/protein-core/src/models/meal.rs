// ABOUTME: Meal analysis models for photographed-meal macro estimation
// ABOUTME: FoodItem, MealAnalysis, and Confidence definitions in the estimator wire shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::{analysis, placeholder_item};
use crate::units::UnitKind;

/// Estimator's self-reported confidence in an analysis
///
/// Decoded only through [`Confidence::parse_lenient`], so any casing is accepted
/// and unrecognized labels are dropped rather than failing the whole analysis.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// High confidence
    High,
    /// Medium confidence
    Medium,
    /// Low confidence
    Low,
}

impl Confidence {
    /// Parse a confidence label, ignoring case and surrounding whitespace
    #[must_use]
    pub fn parse_lenient(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl Display for Confidence {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// A single food item in canonical units
///
/// `quantity` counts canonical units: `1.5` for "150g" when the unit is
/// "100g", `3` for three slices when the unit is "1 slice". The base values
/// are grams of protein and kilocalories for exactly one canonical unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    /// Free-text food name
    pub name: String,
    /// Free-text unit descriptor ("100g", "1 large egg", "1 cup")
    pub unit: String,
    /// Number of canonical units eaten
    pub quantity: f64,
    /// Protein grams per canonical unit
    pub base_protein: f64,
    /// Kilocalories per canonical unit
    pub base_calories: f64,
}

impl FoodItem {
    /// Create a food item
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        quantity: f64,
        base_protein: f64,
        base_calories: f64,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            quantity,
            base_protein,
            base_calories,
        }
    }

    /// Default item for something the estimator missed
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(
            placeholder_item::NAME,
            placeholder_item::UNIT,
            placeholder_item::QUANTITY,
            0.0,
            0.0,
        )
    }

    /// Classification of this item's unit
    #[must_use]
    pub fn unit_kind(&self) -> UnitKind {
        UnitKind::classify(&self.unit)
    }

    /// Protein grams for the eaten quantity
    #[must_use]
    pub fn protein(&self) -> f64 {
        self.base_protein * self.quantity
    }

    /// Kilocalories for the eaten quantity
    #[must_use]
    pub fn calories(&self) -> f64 {
        self.base_calories * self.quantity
    }

    /// Natural-language query used when asking for a re-estimate
    #[must_use]
    pub fn recalculation_query(&self) -> String {
        format!("{}x {}", self.quantity, self.name)
    }
}

/// Transient result of one estimator call
///
/// The totals and confidence are advisory: ledgers recompute their own totals
/// from `items` and never treat these as authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysis {
    /// Estimator-chosen meal name
    #[serde(default = "default_meal_name")]
    pub meal_name: String,
    /// Detected food items in order
    pub items: Vec<FoodItem>,
    /// Estimator-reported protein total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_protein: Option<f64>,
    /// Estimator-reported calorie total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    /// Estimator-reported confidence; unrecognized labels become `None`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_advisory_confidence"
    )]
    pub confidence: Option<Confidence>,
}

fn default_meal_name() -> String {
    analysis::DEFAULT_MEAL_NAME.to_owned()
}

fn deserialize_advisory_confidence<'de, D>(deserializer: D) -> Result<Option<Confidence>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(Confidence::parse_lenient))
}
