// ABOUTME: Error taxonomy for calls to the external meal estimator
// ABOUTME: Separates missing input, failed calls, and unparseable responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Estimator Error Types
//!
//! Every estimator operation resolves to either a `MealAnalysis` or one of
//! these variants. No panic or foreign error type crosses the estimator
//! boundary; the session layer surfaces the message verbatim.

use thiserror::Error;

use super::{AppError, ErrorCode};

/// Failure of a single estimator operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    /// The request is missing its required payload (image or items)
    #[error("{reason}")]
    NoInput {
        /// What was missing
        reason: String,
    },
    /// The external service call failed (network, auth, quota, timeout)
    #[error("{message}")]
    Call {
        /// Human-readable failure description
        message: String,
        /// Whether repeating the call may succeed
        retryable: bool,
    },
    /// The response was not valid JSON or did not match the meal shape
    #[error("{message}")]
    Parse {
        /// Human-readable failure description
        message: String,
    },
}

impl EstimatorError {
    /// Create a "no input" error
    #[must_use]
    pub fn no_input(reason: impl Into<String>) -> Self {
        Self::NoInput {
            reason: reason.into(),
        }
    }

    /// Create a failed call error that should not be retried
    #[must_use]
    pub fn call(message: impl Into<String>) -> Self {
        Self::Call {
            message: message.into(),
            retryable: false,
        }
    }

    /// Create a failed call error that may succeed on retry
    #[must_use]
    pub fn transient_call(message: impl Into<String>) -> Self {
        Self::Call {
            message: message.into(),
            retryable: true,
        }
    }

    /// Create a parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Whether the failed operation may succeed if repeated
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Call { retryable: true, .. })
    }

    /// Error code used when converting into `AppError`
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoInput { .. } => ErrorCode::MissingRequiredField,
            Self::Call {
                retryable: true, ..
            } => ErrorCode::ExternalServiceUnavailable,
            Self::Call { .. } => ErrorCode::ExternalServiceError,
            Self::Parse { .. } => ErrorCode::InvalidFormat,
        }
    }
}

impl From<AppError> for EstimatorError {
    fn from(error: AppError) -> Self {
        if error.code.is_transient() {
            Self::transient_call(error.message)
        } else {
            Self::call(error.message)
        }
    }
}

impl From<EstimatorError> for AppError {
    fn from(error: EstimatorError) -> Self {
        Self::new(error.code(), error.to_string())
    }
}
