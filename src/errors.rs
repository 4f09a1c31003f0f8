// ABOUTME: Unified error handling re-exported from the protein-core crate
// ABOUTME: Gives the application one import path for AppError and the estimator taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! The error types live in `protein_core::errors` so the foundation crate and
//! the application share them. Ledger and session errors are defined next to
//! their modules and convert into [`AppError`].

pub use protein_core::errors::{AppError, AppResult, ErrorCode, EstimatorError};
