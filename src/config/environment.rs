// ABOUTME: Environment configuration for the estimator client and logging
// ABOUTME: Reads API key, model, timeouts, and retry policy from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration, constructed once at startup and injected

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::constants::{env_vars, estimator_defaults};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::LoggingConfig;

/// Settings for the external meal estimator
#[derive(Clone)]
pub struct EstimatorConfig {
    /// Gemini API key
    pub api_key: String,
    /// Model identifier passed to the provider
    pub model: String,
    /// Upper bound on a single estimator call
    pub timeout: Duration,
    /// Upper bound on establishing the HTTP connection
    pub connect_timeout: Duration,
    /// Retries for transient failures; 0 fails fast
    pub max_retries: u32,
    /// Backoff before the first retry, doubled per attempt
    pub retry_backoff: Duration,
}

impl EstimatorConfig {
    /// Create a configuration with defaults for everything but the API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: estimator_defaults::MODEL.to_owned(),
            timeout: Duration::from_secs(estimator_defaults::TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(estimator_defaults::CONNECT_TIMEOUT_SECS),
            max_retries: estimator_defaults::MAX_RETRIES,
            retry_backoff: Duration::from_millis(estimator_defaults::RETRY_BACKOFF_MS),
        }
    }

    /// Load estimator configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigMissing` error if `GEMINI_API_KEY` is unset or empty.
    pub fn from_env() -> AppResult<Self> {
        let api_key = env::var(env_vars::GEMINI_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::ConfigMissing,
                    format!("{} environment variable not set", env_vars::GEMINI_API_KEY),
                )
            })?;

        let model = env::var(env_vars::MODEL)
            .ok()
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| estimator_defaults::MODEL.to_owned());

        Ok(Self {
            api_key,
            model,
            timeout: Duration::from_secs(parse_env_or(
                env_vars::TIMEOUT_SECS,
                estimator_defaults::TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(parse_env_or(
                env_vars::CONNECT_TIMEOUT_SECS,
                estimator_defaults::CONNECT_TIMEOUT_SECS,
            )),
            max_retries: parse_env_or(env_vars::MAX_RETRIES, estimator_defaults::MAX_RETRIES),
            retry_backoff: Duration::from_millis(parse_env_or(
                env_vars::RETRY_BACKOFF_MS,
                estimator_defaults::RETRY_BACKOFF_MS,
            )),
        })
    }

    /// Set the model identifier
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the retry policy
    #[must_use]
    pub const fn with_retries(mut self, max_retries: u32, retry_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = retry_backoff;
        self
    }

    /// Set the per-call timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Debug for EstimatorConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EstimatorConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}

/// Process-wide configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Log level, format, and environment
    pub logging: LoggingConfig,
    /// Estimator client settings
    pub estimator: EstimatorConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required estimator settings are missing.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            logging: LoggingConfig::from_env(),
            estimator: EstimatorConfig::from_env()?,
        })
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring unparseable configuration value");
            default
        }),
        Err(_) => default,
    }
}
