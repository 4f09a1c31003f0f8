// ABOUTME: Meal estimator contract and request types for photo and text estimates
// ABOUTME: Defines the MealEstimator trait, analysis requests, and image uploads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Meal Estimator
//!
//! The estimator is an untrusted, fallible oracle. Both operations resolve to
//! a [`MealAnalysis`] or an [`EstimatorError`]; nothing else crosses this
//! boundary. [`EstimatorClient`] is the production implementation backed by an
//! [`LlmProvider`](crate::llm::LlmProvider); tests substitute their own
//! [`MealEstimator`].

mod client;
mod response;

pub use client::EstimatorClient;
pub use response::{parse_meal_analysis, strip_code_fences};

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;

use crate::errors::{AppError, AppResult, EstimatorError};
use crate::llm::ImageAttachment;
use protein_core::models::MealAnalysis;

/// Contract for anything that can estimate meal macros
#[async_trait]
pub trait MealEstimator: Send + Sync {
    /// Estimate the items in a meal photo
    async fn analyze_image(&self, request: &AnalysisRequest)
        -> Result<MealAnalysis, EstimatorError>;

    /// Re-estimate a corrected list of `"{quantity}x {name}"` queries
    async fn recalculate(&self, queries: &[String]) -> Result<MealAnalysis, EstimatorError>;
}

/// An uploaded meal photo
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// MIME type reported to the estimator
    pub mime_type: String,
    /// Raw image bytes
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Create an upload from bytes and a MIME type
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read an image file, inferring the MIME type from its extension
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unrecognized extension,
    /// `ResourceNotFound` if the file does not exist, and `InternalError` if it
    /// cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let mime_type = mime_type_for_path(path).ok_or_else(|| {
            AppError::invalid_input(format!(
                "Unsupported image type for {}; expected jpg, png, webp, heic, or gif",
                path.display()
            ))
        })?;

        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::not_found(format!("Image {}", path.display())).with_source(e)
            } else {
                AppError::internal(format!("Failed to read image {}: {e}", path.display()))
                    .with_source(e)
            }
        })?;

        Ok(Self::new(mime_type, data))
    }

    /// Whether the upload carries no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn to_attachment(&self) -> ImageAttachment {
        ImageAttachment::new(self.mime_type.clone(), self.data.clone())
    }
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Infer an image MIME type from a file extension
#[must_use]
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Input to a photo analysis
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// The meal photo; required
    pub image: Option<ImageUpload>,
    /// Free-text hint from the user ("2 rotis, dal was thick")
    pub context: Option<String>,
}

impl AnalysisRequest {
    /// Create a request for an image without context
    #[must_use]
    pub const fn new(image: ImageUpload) -> Self {
        Self {
            image: Some(image),
            context: None,
        }
    }

    /// Attach free-text context
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Context trimmed, or `None` when absent or blank
    #[must_use]
    pub fn normalized_context(&self) -> Option<&str> {
        self.context
            .as_deref()
            .map(str::trim)
            .filter(|context| !context.is_empty())
    }

    /// The image, or `NoInput` when it is missing or empty
    ///
    /// # Errors
    ///
    /// Returns [`EstimatorError::NoInput`] if no usable image is attached.
    pub fn require_image(&self) -> Result<&ImageUpload, EstimatorError> {
        self.image
            .as_ref()
            .filter(|image| !image.is_empty())
            .ok_or_else(|| EstimatorError::no_input("No image uploaded"))
    }
}
