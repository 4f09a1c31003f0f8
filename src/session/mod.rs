// ABOUTME: Meal session coordinating the estimator with the item ledger
// ABOUTME: Runs photo analysis and recalculation single-flight and guards user edits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Meal Session
//!
//! A session owns one ledger and one estimator. Photo analysis and
//! recalculation share a single in-flight flag: while either is waiting on the
//! estimator, a second operation and every item edit fail with
//! [`SessionError::Busy`]. A failed estimator call leaves the ledger exactly as
//! it was.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use protein_tracker::config::EstimatorConfig;
//! use protein_tracker::estimator::{AnalysisRequest, EstimatorClient, ImageUpload};
//! use protein_tracker::session::MealSession;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let estimator = EstimatorClient::from_config(&EstimatorConfig::from_env()?);
//! let session = MealSession::new(Arc::new(estimator));
//!
//! let image = ImageUpload::from_path("lunch.jpg").await?;
//! session.analyze_image(&AnalysisRequest::new(image)).await?;
//! println!("{}", session.totals().await);
//! # Ok(())
//! # }
//! ```

mod guard;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, ErrorCode, EstimatorError};
use crate::estimator::{AnalysisRequest, MealEstimator};
use crate::ledger::{ItemId, ItemLedger, ItemUpdate, ItemView, LedgerError, LedgerItem, MealTotals};
use guard::{InFlight, OperationGuard};
use protein_core::models::{Confidence, FoodItem, MealAnalysis};

/// Session operation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// An analysis or recalculation is already waiting on the estimator
    #[error("Another estimate is already in progress")]
    Busy,
    /// An item edit was rejected
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// The estimator failed; the ledger is unchanged
    #[error(transparent)]
    Estimator(#[from] EstimatorError),
}

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Busy => {
                Self::new(ErrorCode::ResourceLocked, SessionError::Busy.to_string())
            }
            SessionError::Ledger(e) => e.into(),
            SessionError::Estimator(e) => e.into(),
        }
    }
}

/// Advisory metadata reported with an estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Estimator-chosen meal name
    pub meal_name: String,
    /// Estimator-reported confidence
    pub confidence: Option<Confidence>,
    /// Estimator-reported protein total; the ledger's own total is authoritative
    pub reported_protein: Option<f64>,
    /// Estimator-reported calorie total; the ledger's own total is authoritative
    pub reported_calories: Option<f64>,
    /// Items ingested into the ledger
    pub item_count: usize,
    /// Ledger generation after ingestion
    pub generation: u64,
    /// When the estimate was applied
    pub estimated_at: DateTime<Utc>,
}

impl AnalysisSummary {
    fn new(analysis: &MealAnalysis, generation: u64) -> Self {
        Self {
            meal_name: analysis.meal_name.clone(),
            confidence: analysis.confidence,
            reported_protein: analysis.total_protein,
            reported_calories: analysis.total_calories,
            item_count: analysis.items.len(),
            generation,
            estimated_at: Utc::now(),
        }
    }
}

/// One user's meal being estimated and corrected
pub struct MealSession {
    ledger: RwLock<ItemLedger>,
    estimator: Arc<dyn MealEstimator>,
    in_flight: InFlight,
    last_analysis: RwLock<Option<AnalysisSummary>>,
}

impl MealSession {
    /// Create a session with an empty ledger
    #[must_use]
    pub fn new(estimator: Arc<dyn MealEstimator>) -> Self {
        Self {
            ledger: RwLock::new(ItemLedger::new()),
            estimator,
            in_flight: InFlight::default(),
            last_analysis: RwLock::new(None),
        }
    }

    fn begin(&self) -> Result<OperationGuard<'_>, SessionError> {
        self.in_flight.try_begin().ok_or_else(|| {
            warn!("Rejected estimator operation while another is in flight");
            SessionError::Busy
        })
    }

    /// Whether an estimator operation is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_set()
    }

    /// Estimate a meal photo and replace the ledger with the detected items
    ///
    /// # Errors
    ///
    /// [`SessionError::Busy`] if another operation is in flight, or the
    /// estimator's failure; the ledger is untouched on error.
    #[instrument(skip_all)]
    pub async fn analyze_image(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisSummary, SessionError> {
        let _guard = self.begin()?;

        let analysis = self.estimator.analyze_image(request).await?;
        let summary = self.apply(analysis).await;
        *self.last_analysis.write().await = Some(summary.clone());

        info!(
            meal = %summary.meal_name,
            items = summary.item_count,
            "Applied meal photo analysis"
        );
        Ok(summary)
    }

    /// Re-estimate every item from its current name and quantity
    ///
    /// Manual corrections to per-unit protein or calories are discarded.
    ///
    /// # Errors
    ///
    /// [`SessionError::Busy`] if another operation is in flight, `NoInput` for
    /// an empty ledger, or the estimator's failure; the ledger is untouched on
    /// error.
    #[instrument(skip_all)]
    pub async fn recalculate(&self) -> Result<AnalysisSummary, SessionError> {
        let _guard = self.begin()?;

        let queries = self.ledger.read().await.recalculation_queries();
        if queries.is_empty() {
            return Err(EstimatorError::no_input("No items to recalculate").into());
        }

        let analysis = self.estimator.recalculate(&queries).await?;
        let summary = self.apply(analysis).await;

        info!(items = summary.item_count, "Applied recalculated macros");
        Ok(summary)
    }

    async fn apply(&self, analysis: MealAnalysis) -> AnalysisSummary {
        let mut ledger = self.ledger.write().await;
        ledger.replace_all(analysis.items.iter().cloned());
        AnalysisSummary::new(&analysis, ledger.generation())
    }

    /// Write access to the ledger for an item edit, unless an operation is in flight
    async fn edit(&self) -> Result<tokio::sync::RwLockWriteGuard<'_, ItemLedger>, SessionError> {
        let ledger = self.ledger.write().await;
        if self.in_flight.is_set() {
            return Err(SessionError::Busy);
        }
        Ok(ledger)
    }

    /// Apply a single-field edit; `Ok(false)` if the id is unknown
    ///
    /// # Errors
    ///
    /// [`SessionError::Busy`] during an estimator operation, or a rejected
    /// non-finite number.
    pub async fn update(&self, id: ItemId, update: ItemUpdate) -> Result<bool, SessionError> {
        Ok(self.edit().await?.update(id, update)?)
    }

    /// Set a quantity as the user sees it (grams for bulk units)
    ///
    /// # Errors
    ///
    /// [`SessionError::Busy`] during an estimator operation, or a rejected
    /// non-finite number.
    pub async fn set_displayed_quantity(
        &self,
        id: ItemId,
        displayed: f64,
    ) -> Result<bool, SessionError> {
        let mut ledger = self.edit().await?;
        let Some(kind) = ledger.get(id).map(FoodItem::unit_kind) else {
            return Ok(false);
        };
        Ok(ledger.update(id, ItemUpdate::Quantity(kind.canonical_from_display(displayed)))?)
    }

    /// Remove an item; `Ok(false)` if the id is unknown
    ///
    /// # Errors
    ///
    /// [`SessionError::Busy`] during an estimator operation.
    pub async fn remove(&self, id: ItemId) -> Result<bool, SessionError> {
        Ok(self.edit().await?.remove(id).is_some())
    }

    /// Append an item
    ///
    /// # Errors
    ///
    /// [`SessionError::Busy`] during an estimator operation, or a rejected
    /// non-finite number.
    pub async fn add(&self, item: FoodItem) -> Result<ItemId, SessionError> {
        Ok(self.edit().await?.add(item)?)
    }

    /// Append the default "missing item"
    ///
    /// # Errors
    ///
    /// [`SessionError::Busy`] during an estimator operation.
    pub async fn add_placeholder(&self) -> Result<ItemId, SessionError> {
        Ok(self.edit().await?.add_placeholder())
    }

    /// Current totals
    pub async fn totals(&self) -> MealTotals {
        self.ledger.read().await.totals()
    }

    /// Current items in order
    pub async fn items(&self) -> Vec<LedgerItem> {
        self.ledger.read().await.items().to_vec()
    }

    /// Display rows in order
    pub async fn views(&self) -> Vec<ItemView> {
        self.ledger.read().await.views()
    }

    /// Current ledger generation
    pub async fn generation(&self) -> u64 {
        self.ledger.read().await.generation()
    }

    /// Metadata of the most recent photo analysis
    pub async fn last_analysis(&self) -> Option<AnalysisSummary> {
        self.last_analysis.read().await.clone()
    }
}

impl std::fmt::Debug for MealSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealSession")
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}
