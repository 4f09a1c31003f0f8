// ABOUTME: Configuration management module for startup settings
// ABOUTME: Handles environment-driven estimator and logging options
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! All configuration comes from environment variables and is loaded once at
//! startup:
//!
//! - **Environment**: Estimator API key, model, timeouts, and retry policy
//! - **Types**: Log level and the development/production switch for log output

/// Environment-driven estimator and application configuration
pub mod environment;
/// Log level and environment enums
pub mod types;

pub use environment::{AppConfig, EstimatorConfig};
pub use types::{Environment, LogLevel};
