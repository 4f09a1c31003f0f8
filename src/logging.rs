// ABOUTME: Logging configuration and structured logging setup for the tracker
// ABOUTME: Configures log levels, formatters, and noise reduction for tracing output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration

use anyhow::Result;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{Environment, LogLevel};
use crate::constants::{env_vars, service_names};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's logs
    pub level: LogLevel,
    /// `RUST_LOG` directives used verbatim, when they are more than a bare level
    pub custom_filter: Option<String>,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Development or production, which picks the format and location defaults
    pub environment: Environment,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for terminals
    Compact,
}

impl LogFormat {
    /// Parse from string, falling back to the environment's default
    #[must_use]
    pub fn from_str_or(s: Option<&str>, environment: Environment) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("pretty") => Self::Pretty,
            Some("compact") => Self::Compact,
            _ if environment.is_production() => Self::Json,
            _ => Self::Compact,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            custom_filter: None,
            format: LogFormat::Compact,
            include_location: false,
            include_spans: false,
            service_name: service_names::PROTEIN_TRACKER.into(),
            environment: Environment::Development,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var(env_vars::ENVIRONMENT)
            .map(|s| Environment::from_str_or_default(&s))
            .unwrap_or_default();
        let is_production = environment.is_production();
        let rust_log = env::var("RUST_LOG")
            .ok()
            .filter(|raw| !raw.trim().is_empty());
        let (level, custom_filter) = match rust_log {
            Some(raw) => match raw.parse::<LogLevel>() {
                Ok(level) => (level, None),
                Err(_) => (LogLevel::default(), Some(raw)),
            },
            None => (LogLevel::default(), None),
        };

        Self {
            level,
            custom_filter,
            format: LogFormat::from_str_or(env::var("LOG_FORMAT").ok().as_deref(), environment),
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::PROTEIN_TRACKER.into()),
            environment,
        }
    }

    /// Override the level (used by the CLI `--verbose` flag)
    ///
    /// Replaces any custom `RUST_LOG` directives.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self.custom_filter = None;
        self
    }

    /// Filter directives in the order they are applied
    ///
    /// Custom `RUST_LOG` directives pass through untouched. Otherwise the
    /// level applies globally and to this crate, with HTTP client noise capped
    /// at `warn`.
    #[must_use]
    pub fn filter_directives(&self) -> Vec<String> {
        if let Some(custom) = &self.custom_filter {
            return vec![custom.clone()];
        }
        let level = self.level.as_str();
        vec![
            level.to_owned(),
            "hyper=warn".to_owned(),
            "hyper_util=warn".to_owned(),
            "reqwest=warn".to_owned(),
            format!("protein_tracker={level}"),
        ]
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::new(self.filter_directives().join(","))
    }

    /// Initialize the global tracing subscriber
    ///
    /// Logs go to stderr so command output on stdout stays machine-readable.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        match self.format {
            LogFormat::Json => {
                let layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .with_span_events(span_events)
                    .json();
                registry.with(layer).try_init()?;
            }
            LogFormat::Pretty => {
                let layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .with_span_events(span_events);
                registry.with(layer).try_init()?;
            }
            LogFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr)
                    .with_span_events(FmtSpan::NONE);
                registry.with(layer).try_init()?;
            }
        }

        info!(
            service.name = %self.service_name,
            service.version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            log.filter = %self.filter_directives().join(","),
            log.format = ?self.format,
            "Protein tracker starting up"
        );

        Ok(())
    }
}
