// ABOUTME: Data models shared by the estimator, ledger, and session layers
// ABOUTME: Re-exports meal analysis and food item definitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod meal;

pub use meal::{Confidence, FoodItem, MealAnalysis};
