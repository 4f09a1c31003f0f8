// ABOUTME: Log verbosity and deployment mode that shape the tracker's log output
// ABOUTME: Parses RUST_LOG levels and the ENVIRONMENT switch between dev and production logs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::errors::AppError;

/// Verbosity of the tracker's own log output
///
/// Parsed from a bare `RUST_LOG` value such as `debug`. Anything richer
/// (`protein_tracker=debug,reqwest=info`) is not a level and is handed to the
/// filter untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Failed estimates and startup errors only
    Error,
    /// Adds retried estimator calls and rejected operations
    Warn,
    /// Adds ledger replacements and startup (default)
    #[default]
    Info,
    /// Adds every estimator request and response
    Debug,
    /// Everything, including HTTP client internals
    Trace,
}

impl LogLevel {
    /// Directive spelling used in filters
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Parse a level, falling back to `Info` for anything unrecognized
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(AppError::invalid_input(format!("'{s}' is not a log level"))),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Where the tracker runs, as far as logging is concerned
///
/// Production defaults to JSON lines with source locations; development to
/// compact terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local use (default)
    #[default]
    Development,
    /// Deployed use with machine-read logs
    Production,
}

impl Environment {
    /// `production` or `prod` (any case) selects production; anything else is development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}
