// ABOUTME: Shared test utilities for protein tracker integration tests
// ABOUTME: Provides quiet logging, food fixtures, and scripted provider and estimator fakes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `protein_tracker`

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use protein_tracker::config::EstimatorConfig;
use protein_tracker::errors::{AppError, ErrorCode, EstimatorError};
use protein_tracker::estimator::{AnalysisRequest, MealEstimator};
use protein_tracker::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use protein_tracker::models::{FoodItem, MealAnalysis};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn egg() -> FoodItem {
    FoodItem::new("Egg", "1 large egg", 2.0, 6.0, 70.0)
}

pub fn rice() -> FoodItem {
    FoodItem::new("Rice", "100g", 1.0, 2.7, 130.0)
}

pub fn milk() -> FoodItem {
    FoodItem::new("Milk", "100ml", 2.5, 3.4, 42.0)
}

pub fn analysis(meal_name: &str, items: Vec<FoodItem>) -> MealAnalysis {
    MealAnalysis {
        meal_name: meal_name.to_owned(),
        items,
        total_protein: None,
        total_calories: None,
        confidence: None,
    }
}

/// Estimator JSON for the given items in the camelCase wire shape
pub fn meal_json(meal_name: &str, items: &[FoodItem]) -> String {
    json!({
        "mealName": meal_name,
        "items": items,
        "totalProtein": items.iter().map(FoodItem::protein).sum::<f64>(),
        "totalCalories": items.iter().map(FoodItem::calories).sum::<f64>(),
        "confidence": "High"
    })
    .to_string()
}

/// Estimator config with a dummy key and a fast retry policy
pub fn test_config() -> EstimatorConfig {
    EstimatorConfig::new("test-key").with_model("test-model")
}

// ============================================================================
// Scripted LLM provider
// ============================================================================

/// One scripted provider outcome
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with this text
    Text(String),
    /// Fail with this code and message
    Fail(ErrorCode, String),
    /// Never respond
    Hang,
}

/// Provider replaying scripted replies and recording every request
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ChatRequest>>,
    capabilities: LlmCapabilities,
}

impl ScriptedProvider {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Self::with_capabilities(replies, LlmCapabilities::multimodal())
    }

    pub fn with_capabilities(
        replies: impl IntoIterator<Item = Reply>,
        capabilities: LlmCapabilities,
    ) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            capabilities,
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();

        match reply {
            Some(Reply::Text(content)) => Ok(ChatResponse {
                content,
                model: request.model.clone().unwrap_or_default(),
                usage: None,
                finish_reason: Some("STOP".to_owned()),
            }),
            Some(Reply::Fail(code, message)) => Err(AppError::new(code, message)),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(AppError::internal("no scripted reply left")),
        }
    }
}

// ============================================================================
// Gated meal estimator
// ============================================================================

/// Estimator returning scripted results, optionally held until released
pub struct GatedEstimator {
    results: Mutex<VecDeque<Result<MealAnalysis, EstimatorError>>>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<Vec<String>>>,
}

impl GatedEstimator {
    /// Estimator that answers immediately
    pub fn immediate(
        results: impl IntoIterator<Item = Result<MealAnalysis, EstimatorError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into_iter().collect()),
            gate: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Estimator that waits for a `notify_one` on the returned gate per call
    pub fn gated(
        results: impl IntoIterator<Item = Result<MealAnalysis, EstimatorError>>,
    ) -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let estimator = Arc::new(Self {
            results: Mutex::new(results.into_iter().collect()),
            gate: Some(gate.clone()),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        });
        (estimator, gate)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_queries(&self) -> Vec<Vec<String>> {
        self.queries.lock().unwrap().clone()
    }

    async fn next(&self) -> Result<MealAnalysis, EstimatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EstimatorError::call("no scripted result left")))
    }
}

#[async_trait]
impl MealEstimator for GatedEstimator {
    async fn analyze_image(
        &self,
        request: &AnalysisRequest,
    ) -> Result<MealAnalysis, EstimatorError> {
        request.require_image()?;
        self.next().await
    }

    async fn recalculate(&self, queries: &[String]) -> Result<MealAnalysis, EstimatorError> {
        self.queries.lock().unwrap().push(queries.to_vec());
        self.next().await
    }
}
