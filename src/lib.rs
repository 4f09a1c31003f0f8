// ABOUTME: Library entry point for the photographed-meal protein tracker
// ABOUTME: Wires the estimator client, item ledger, and meal session modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Protein Tracker
//!
//! Estimates the protein and calories of a photographed meal with a
//! multimodal model, then lets the user correct item names and quantities and
//! re-estimate.
//!
//! ## Architecture
//!
//! - **Units** (`protein_core::units`): classifies free-text units as bulk or
//!   discrete and scales bulk quantities to grams for display
//! - **Ledger**: ordered items with fresh ids and totals derived on read
//! - **Estimator**: prompts the model and validates its JSON answer
//! - **Session**: single-flight photo analysis and recalculation over a ledger
//! - **LLM**: provider abstraction with the Gemini implementation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use protein_tracker::config::AppConfig;
//! use protein_tracker::errors::AppResult;
//! use protein_tracker::estimator::EstimatorClient;
//! use protein_tracker::session::MealSession;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AppConfig::from_env()?;
//!     let session = MealSession::new(Arc::new(EstimatorClient::from_config(&config.estimator)));
//!     println!("{}", session.totals().await);
//!     Ok(())
//! }
//! ```

/// Environment-based configuration
pub mod config;

/// Application constants
pub mod constants;

/// Error types
pub mod errors;

/// Meal estimator contract and LLM-backed client
pub mod estimator;

/// Item ledger and display projections
pub mod ledger;

/// LLM provider abstraction
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Meal session orchestration
pub mod session;

pub use protein_core::models;
pub use protein_core::units;
