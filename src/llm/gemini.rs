// ABOUTME: Google Gemini LLM provider used as the meal estimator backend
// ABOUTME: Sends text and inline image parts to the generateContent REST endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini Provider
//!
//! Implementation of the `LlmProvider` trait for Google's Gemini models.
//!
//! ## Configuration
//!
//! Set the `GEMINI_API_KEY` environment variable with your API key from
//! Google AI Studio. The model defaults to `gemini-2.5-flash`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use protein_tracker::config::EstimatorConfig;
//! use protein_tracker::llm::{ChatMessage, ChatRequest, GeminiProvider, LlmProvider};
//! use protein_tracker::errors::AppError;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let provider = GeminiProvider::from_config(&EstimatorConfig::from_env()?);
//!     let request = ChatRequest::new(vec![ChatMessage::user("1x banana")]);
//!     let response = provider.complete(&request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::http_client::build_http_client;
use super::{
    truncate_for_log, ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider,
    MessageRole, TokenUsage,
};
use crate::config::EstimatorConfig;
use crate::errors::{AppError, ErrorCode};

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key (kept out of URLs so it never shows in errors)
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Service name used in error messages
const SERVICE_NAME: &str = "Gemini";

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Content structure for Gemini API
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

/// Part of content: text, an inline image, or anything else the API returns
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inline_data", alias = "inlineData")]
        inline_data: InlineData,
    },
    Other(serde_json::Value),
}

/// Base64-encoded inline payload
#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mime_type", alias = "mimeType")]
    mime_type: String,
    data: String,
}

/// Generation configuration
#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    candidate_count: u32,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
    error: Option<GeminiError>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

/// Usage metadata from Gemini API response
#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    total: Option<u32>,
}

/// API error response from Gemini
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini LLM provider
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    default_model: String,
}

impl GeminiProvider {
    /// Create a provider with an API key, default model, and default timeouts
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(&EstimatorConfig::new(api_key))
    }

    /// Create a provider from estimator configuration
    #[must_use]
    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            client: build_http_client(config.timeout, config.connect_timeout),
            default_model: config.model.clone(),
        }
    }

    /// Build the API URL for a model and method
    fn build_url(model: &str, method: &str) -> String {
        format!("{API_BASE_URL}/models/{model}:{method}")
    }

    /// Convert a message into Gemini content with text first, images after
    fn convert_message(message: &ChatMessage, role: Option<&str>) -> GeminiContent {
        let mut parts = Vec::with_capacity(1 + message.images.len());
        if !message.content.is_empty() {
            parts.push(ContentPart::Text {
                text: message.content.clone(),
            });
        }
        parts.extend(message.images.iter().map(|image| ContentPart::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: BASE64.encode(&image.data),
            },
        }));

        GeminiContent {
            role: role.map(str::to_owned),
            parts,
        }
    }

    /// Build a Gemini API request from a `ChatRequest`
    ///
    /// System messages go to the separate `system_instruction` field; user and
    /// assistant messages map to the `user` and `model` roles.
    fn build_gemini_request(request: &ChatRequest) -> GeminiRequest {
        let mut contents = Vec::new();
        let mut system_instruction = None;

        for message in &request.messages {
            match message.role {
                MessageRole::System => {
                    system_instruction = Some(Self::convert_message(message, None));
                }
                MessageRole::User => contents.push(Self::convert_message(message, Some("user"))),
                MessageRole::Assistant => {
                    contents.push(Self::convert_message(message, Some("model")));
                }
            }
        }

        let generation_config = (request.temperature.is_some()
            || request.max_tokens.is_some()
            || request.json_output)
            .then(|| GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: request.json_output.then_some("application/json"),
                candidate_count: 1,
            });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    /// Extract text content from Gemini response, joining multi-part text
    fn extract_content(response: &GeminiResponse) -> Result<String, AppError> {
        let parts = response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default();

        let text: String = parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::InlineData { .. } | ContentPart::Other(_) => None,
            })
            .collect();

        if text.is_empty() {
            return Err(AppError::external_service(
                SERVICE_NAME,
                "No content in Gemini response",
            ));
        }
        Ok(text)
    }

    /// Convert usage metadata to our token usage format
    fn convert_usage(metadata: &UsageMetadata) -> TokenUsage {
        TokenUsage {
            prompt_tokens: metadata.prompt.unwrap_or(0),
            completion_tokens: metadata.candidates.unwrap_or(0),
            total_tokens: metadata.total.unwrap_or(0),
        }
    }

    /// Map API error status to appropriate error type
    fn map_api_error(status: u16, response_text: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);

        match status {
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                Self::extract_quota_message(&message),
            ),
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{SERVICE_NAME} rejected the API key ({status}): {message}"),
            ),
            400 if message.contains("API key") => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{SERVICE_NAME} rejected the API key: {message}"),
            ),
            500..=599 => AppError::external_unavailable(
                SERVICE_NAME,
                format!("API error ({status}): {message}"),
            ),
            _ => AppError::external_service(SERVICE_NAME, format!("API error ({status}): {message}")),
        }
    }

    /// Extract a user-friendly quota/rate limit message from Gemini error
    ///
    /// Gemini phrases the delay as "Please retry in 6.406453963s."
    fn extract_quota_message(message: &str) -> String {
        const RETRY_PREFIX: &str = "Please retry in ";

        message
            .find(RETRY_PREFIX)
            .map(|pos| &message[pos + RETRY_PREFIX.len()..])
            .and_then(|rest| rest.split_once('s'))
            .and_then(|(seconds, _)| seconds.parse::<f64>().ok())
            .map_or_else(
                || "AI service quota exceeded. Please wait a moment and try again.".to_owned(),
                |seconds| {
                    format!(
                        "AI service quota exceeded. Please try again in {} seconds.",
                        seconds.ceil() as u64
                    )
                },
            )
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::multimodal()
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip(self, request))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let url = Self::build_url(model, "generateContent");

        let gemini_request = Self::build_gemini_request(request);

        debug!(model, images = request.has_images(), "Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                AppError::external_unavailable(SERVICE_NAME, format!("HTTP request failed: {e}"))
                    .with_source(e)
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            AppError::external_unavailable(SERVICE_NAME, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, response = %truncate_for_log(&response_text), "Failed to parse response");
                AppError::external_service(SERVICE_NAME, format!("Failed to parse Gemini response: {e}"))
            })?;

        if let Some(error) = gemini_response.error.as_ref() {
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("API error: {}", error.message),
            ));
        }

        let content = Self::extract_content(&gemini_response)?;
        let usage = gemini_response
            .usage_metadata
            .as_ref()
            .map(Self::convert_usage);
        let finish_reason = gemini_response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.finish_reason.clone());

        debug!(?usage, "Successfully received Gemini response");

        Ok(ChatResponse {
            content,
            model: model.to_owned(),
            usage,
            finish_reason,
        })
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("default_model", &self.default_model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
