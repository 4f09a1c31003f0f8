// ABOUTME: Core types and constants for the protein tracker meal estimator
// ABOUTME: Foundation crate with error handling, meal models, and the unit model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Protein Core
//!
//! Foundation crate shared by the estimator, ledger, and session layers.
//! It is designed to change infrequently, enabling incremental compilation
//! benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `EstimatorError`
//! - **constants**: Unit model constants and placeholder item defaults
//! - **models**: `FoodItem`, `MealAnalysis`, and `Confidence`
//! - **units**: Bulk-vs-discrete unit classification and display scaling

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Meal and food item data models
pub mod models;

/// Unit classification and display/canonical quantity transforms
pub mod units;
