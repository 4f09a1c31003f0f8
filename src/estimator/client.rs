// ABOUTME: LLM-backed meal estimator with per-call timeout and bounded retries
// ABOUTME: Builds prompts, calls the provider, and parses responses into meal analyses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::{debug, instrument, warn};

use super::response::parse_meal_analysis;
use super::{AnalysisRequest, MealEstimator};
use crate::config::EstimatorConfig;
use crate::errors::EstimatorError;
use crate::llm::prompts::{
    analysis_prompt, get_meal_estimator_system_prompt, recalculation_prompt,
};
use crate::llm::{ChatMessage, ChatRequest, GeminiProvider, LlmProvider};
use protein_core::models::MealAnalysis;

/// Upper bound on the backoff doubling exponent
const MAX_BACKOFF_SHIFT: u32 = 10;

/// Which estimator operation a call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Analysis,
    Recalculation,
}

impl Operation {
    const fn failure_prefix(self) -> &'static str {
        match self {
            Self::Analysis => "Failed to analyze the image",
            Self::Recalculation => "Failed to recalculate macros",
        }
    }

    /// Prefix a failure with the operation that produced it
    fn describe(self, error: EstimatorError) -> EstimatorError {
        let prefix = self.failure_prefix();
        match error {
            EstimatorError::Call { message, retryable } => EstimatorError::Call {
                message: format!("{prefix}: {message}"),
                retryable,
            },
            EstimatorError::Parse { message } => {
                EstimatorError::parse(format!("{prefix}: {message}"))
            }
            no_input @ EstimatorError::NoInput { .. } => no_input,
        }
    }
}

/// Meal estimator backed by an [`LlmProvider`]
///
/// Every provider call is bounded by `timeout`. Retryable call failures
/// (timeouts, rate limits, unavailable service) are repeated up to
/// `max_retries` times, waiting `retry_backoff`, then twice that, and so on.
/// Parse failures are never retried.
pub struct EstimatorClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl EstimatorClient {
    /// Create a client over any provider using the given call policy
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &EstimatorConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            timeout: config.timeout,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        }
    }

    /// Create a Gemini-backed client from configuration
    #[must_use]
    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(Arc::new(GeminiProvider::from_config(config)), config)
    }

    /// Name of the underlying provider
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    fn build_request(&self, user_message: ChatMessage) -> ChatRequest {
        let capabilities = self.provider.capabilities();
        let mut messages = Vec::with_capacity(2);
        let user_message = if capabilities.supports_system_messages() {
            messages.push(ChatMessage::system(get_meal_estimator_system_prompt()));
            user_message
        } else {
            ChatMessage {
                content: format!(
                    "{}\n\n{}",
                    get_meal_estimator_system_prompt(),
                    user_message.content
                ),
                ..user_message
            }
        };
        messages.push(user_message);

        let request = ChatRequest::new(messages).with_model(self.model.clone());
        if capabilities.supports_json_mode() {
            request.with_json_output()
        } else {
            request
        }
    }

    fn backoff_for(&self, retry: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(1_u32 << retry.min(MAX_BACKOFF_SHIFT))
    }

    /// Run one provider call under the timeout and parse its output
    async fn attempt(&self, request: &ChatRequest) -> Result<MealAnalysis, EstimatorError> {
        let response = timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                EstimatorError::transient_call(format!(
                    "{} did not respond within {}s",
                    self.provider.display_name(),
                    self.timeout.as_secs_f64()
                ))
            })??;

        debug!(
            model = %response.model,
            finish_reason = ?response.finish_reason,
            "Estimator responded"
        );
        parse_meal_analysis(&response.content)
    }

    async fn execute(
        &self,
        operation: Operation,
        request: &ChatRequest,
    ) -> Result<MealAnalysis, EstimatorError> {
        let mut retry = 0;
        loop {
            match self.attempt(request).await {
                Ok(analysis) => return Ok(analysis),
                Err(error) if error.is_retryable() && retry < self.max_retries => {
                    let delay = self.backoff_for(retry);
                    retry += 1;
                    warn!(
                        ?operation,
                        retry,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "Retrying estimator call"
                    );
                    sleep(delay).await;
                }
                Err(error) => return Err(operation.describe(error)),
            }
        }
    }
}

#[async_trait]
impl MealEstimator for EstimatorClient {
    #[instrument(skip_all)]
    async fn analyze_image(
        &self,
        request: &AnalysisRequest,
    ) -> Result<MealAnalysis, EstimatorError> {
        let image = request.require_image()?;

        if !self.provider.capabilities().supports_vision() {
            return Err(EstimatorError::call(format!(
                "{} does not accept images",
                self.provider.display_name()
            )));
        }

        let message = ChatMessage::user_with_image(
            analysis_prompt(request.normalized_context()),
            image.to_attachment(),
        );
        let chat_request = self.build_request(message);

        debug!(
            mime_type = %image.mime_type,
            bytes = image.data.len(),
            has_context = request.normalized_context().is_some(),
            "Requesting meal photo analysis"
        );
        self.execute(Operation::Analysis, &chat_request).await
    }

    #[instrument(skip_all, fields(items = queries.len()))]
    async fn recalculate(&self, queries: &[String]) -> Result<MealAnalysis, EstimatorError> {
        if queries.is_empty() {
            return Err(EstimatorError::no_input("No items to recalculate"));
        }

        let chat_request = self.build_request(ChatMessage::user(recalculation_prompt(queries)));

        debug!("Requesting macro recalculation");
        self.execute(Operation::Recalculation, &chat_request).await
    }
}

impl std::fmt::Debug for EstimatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EstimatorClient")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}
