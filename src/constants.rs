// ABOUTME: Application constants for environment variables and service defaults
// ABOUTME: Groups configuration keys and estimator defaults by domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Unit model constants live in `protein_core::constants` and are re-exported
//! here so callers need a single import path.

pub use protein_core::constants::{analysis, placeholder_item, units};

/// Service identification for structured logging
pub mod service_names {
    /// Service name used in startup logs
    pub const PROTEIN_TRACKER: &str = "protein-tracker";
}

/// Environment variable names
pub mod env_vars {
    /// Gemini API key (required)
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    /// Model override
    pub const MODEL: &str = "PROTEIN_TRACKER_MODEL";
    /// Total request timeout in seconds
    pub const TIMEOUT_SECS: &str = "PROTEIN_TRACKER_TIMEOUT_SECS";
    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: &str = "PROTEIN_TRACKER_CONNECT_TIMEOUT_SECS";
    /// Retries for transient estimator failures
    pub const MAX_RETRIES: &str = "PROTEIN_TRACKER_MAX_RETRIES";
    /// Initial retry backoff in milliseconds
    pub const RETRY_BACKOFF_MS: &str = "PROTEIN_TRACKER_RETRY_BACKOFF_MS";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Estimator call defaults
pub mod estimator_defaults {
    /// Default Gemini model
    pub const MODEL: &str = "gemini-2.5-flash";
    /// Default total request timeout in seconds
    pub const TIMEOUT_SECS: u64 = 60;
    /// Default connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Default retry count (fail fast)
    pub const MAX_RETRIES: u32 = 0;
    /// Default initial retry backoff in milliseconds
    pub const RETRY_BACKOFF_MS: u64 = 500;
    /// Maximum characters of a bad response echoed into logs
    pub const LOGGED_RESPONSE_CHARS: usize = 512;
}
