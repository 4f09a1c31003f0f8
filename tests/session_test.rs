// ABOUTME: Tests for meal session orchestration over a fake estimator
// ABOUTME: Covers single-flight analysis and recalculation, busy edits, and failure isolation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{
    analysis, egg, init_test_logging, meal_json, rice, test_config, GatedEstimator, Reply,
    ScriptedProvider,
};
use protein_tracker::errors::{AppError, ErrorCode, EstimatorError};
use protein_tracker::estimator::{AnalysisRequest, EstimatorClient, ImageUpload};
use protein_tracker::ledger::{ItemUpdate, MealTotals};
use protein_tracker::models::{Confidence, FoodItem};
use protein_tracker::session::{MealSession, SessionError};

fn photo_request() -> AnalysisRequest {
    AnalysisRequest::new(ImageUpload::new("image/jpeg", vec![1, 2, 3]))
}

async fn wait_until_busy(session: &MealSession) {
    while !session.is_busy() {
        tokio::task::yield_now().await;
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Photo analysis
// ============================================================================

#[tokio::test]
async fn test_analysis_populates_ledger() {
    init_test_logging();
    let mut result = analysis("Breakfast", vec![egg(), rice()]);
    result.total_protein = Some(999.0);
    result.confidence = Some(Confidence::Medium);
    let estimator = GatedEstimator::immediate([Ok(result)]);
    let session = MealSession::new(estimator);

    let summary = session.analyze_image(&photo_request()).await.unwrap();
    assert_eq!(summary.meal_name, "Breakfast");
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.generation, 1);
    assert_eq!(summary.reported_protein, Some(999.0));
    assert_eq!(session.last_analysis().await, Some(summary));

    let items = session.items().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item, egg());

    // Estimator totals are advisory; the ledger sums its own items
    assert_close(session.totals().await.protein, 12.0 + 2.7);
}

#[tokio::test]
async fn test_analysis_without_image_leaves_ledger_empty() {
    let estimator = GatedEstimator::immediate([]);
    let session = MealSession::new(estimator.clone());

    let error = session
        .analyze_image(&AnalysisRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        SessionError::Estimator(EstimatorError::NoInput { .. })
    ));
    assert!(session.items().await.is_empty());
    assert_eq!(estimator.call_count(), 0);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_failed_analysis_keeps_previous_ledger() {
    init_test_logging();
    let estimator = GatedEstimator::immediate([
        Ok(analysis("Lunch", vec![rice()])),
        Err(EstimatorError::call("Failed to analyze the image: quota")),
    ]);
    let session = MealSession::new(estimator);

    session.analyze_image(&photo_request()).await.unwrap();
    let before = session.items().await;

    let error = session.analyze_image(&photo_request()).await.unwrap_err();
    assert_eq!(error.to_string(), "Failed to analyze the image: quota");
    assert_eq!(session.items().await, before);
    assert_eq!(session.last_analysis().await.unwrap().meal_name, "Lunch");
}

// ============================================================================
// Recalculation
// ============================================================================

#[tokio::test]
async fn test_recalculate_sends_current_names_and_quantities() {
    init_test_logging();
    let estimator = GatedEstimator::immediate([
        Ok(analysis("Lunch", vec![egg(), rice()])),
        Ok(analysis(
            "Corrected Meal",
            vec![
                FoodItem::new("Duck egg", "1 duck egg", 3.0, 9.0, 130.0),
                FoodItem::new("Rice", "100g", 1.5, 2.5, 120.0),
            ],
        )),
    ]);
    let session = MealSession::new(estimator.clone());
    session.analyze_image(&photo_request()).await.unwrap();

    let items = session.items().await;
    let (egg_id, rice_id) = (items[0].id, items[1].id);
    session
        .update(egg_id, ItemUpdate::Name("Duck egg".to_owned()))
        .await
        .unwrap();
    session.set_displayed_quantity(egg_id, 3.0).await.unwrap();
    session.set_displayed_quantity(rice_id, 150.0).await.unwrap();
    session
        .update(rice_id, ItemUpdate::BaseProtein(50.0))
        .await
        .unwrap();

    let summary = session.recalculate().await.unwrap();
    assert_eq!(summary.generation, 2);
    assert_eq!(
        estimator.recorded_queries(),
        vec![vec!["3x Duck egg".to_owned(), "1.5x Rice".to_owned()]]
    );

    let items = session.items().await;
    assert!(items.iter().all(|entry| entry.id != egg_id && entry.id != rice_id));
    // Manual base corrections are replaced by the new estimate
    assert_close(items[1].item.base_protein, 2.5);
    // Photo metadata is only replaced by photo analysis
    assert_eq!(session.last_analysis().await.unwrap().meal_name, "Lunch");
}

#[tokio::test]
async fn test_recalculate_empty_ledger_is_no_input() {
    let estimator = GatedEstimator::immediate([]);
    let session = MealSession::new(estimator.clone());

    let error = session.recalculate().await.unwrap_err();
    assert!(matches!(
        error,
        SessionError::Estimator(EstimatorError::NoInput { .. })
    ));
    assert_eq!(estimator.call_count(), 0);
    assert_eq!(session.totals().await, MealTotals::default());
}

#[tokio::test]
async fn test_malformed_recalculation_leaves_ledger_unchanged() {
    init_test_logging();
    let estimator = GatedEstimator::immediate([
        Ok(analysis("Lunch", vec![egg(), rice()])),
        Err(EstimatorError::parse(
            "Failed to recalculate macros: expected value at line 1 column 1",
        )),
    ]);
    let session = MealSession::new(estimator);
    session.analyze_image(&photo_request()).await.unwrap();
    let before_items = session.items().await;
    let before_totals = session.totals().await;

    let error = session.recalculate().await.unwrap_err();
    assert!(matches!(
        error,
        SessionError::Estimator(EstimatorError::Parse { .. })
    ));
    assert_eq!(session.items().await, before_items);
    assert_eq!(session.totals().await, before_totals);
    assert_eq!(session.generation().await, 1);
}

#[tokio::test]
async fn test_malformed_model_reply_leaves_ledger_unchanged() {
    init_test_logging();
    let provider = ScriptedProvider::new([
        Reply::Text(format!("```json\n{}\n```", meal_json("Lunch", &[egg(), rice()]))),
        Reply::Text("not json at all".to_owned()),
    ]);
    let client = EstimatorClient::new(provider.clone(), &test_config());
    let session = MealSession::new(Arc::new(client));

    session.analyze_image(&photo_request()).await.unwrap();
    let before_items = session.items().await;
    let before_totals = session.totals().await;

    let error = session.recalculate().await.unwrap_err();
    match error {
        SessionError::Estimator(EstimatorError::Parse { message }) => {
            assert!(message.starts_with("Failed to recalculate macros"));
        }
        other => panic!("expected a parse failure, got {other:?}"),
    }

    assert_eq!(provider.call_count(), 2);
    assert_eq!(session.items().await, before_items);
    assert_eq!(session.totals().await, before_totals);
    assert_eq!(session.generation().await, 1);
    assert!(!session.is_busy());
}

// ============================================================================
// Single flight
// ============================================================================

#[tokio::test]
async fn test_second_recalculation_is_rejected_while_pending() {
    init_test_logging();
    let (estimator, gate) = GatedEstimator::gated([
        Ok(analysis("Corrected Meal", vec![rice()])),
        Ok(analysis("Never", vec![egg()])),
    ]);
    let session = Arc::new(MealSession::new(estimator.clone()));
    session.add(egg()).await.unwrap();

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.recalculate().await }
    });
    wait_until_busy(&session).await;

    assert_eq!(session.recalculate().await, Err(SessionError::Busy));
    assert_eq!(
        session.analyze_image(&photo_request()).await,
        Err(SessionError::Busy)
    );

    gate.notify_one();
    pending.await.unwrap().unwrap();

    assert_eq!(estimator.call_count(), 1);
    assert!(!session.is_busy());
    assert_eq!(session.items().await[0].item, rice());
}

#[tokio::test]
async fn test_edits_are_rejected_while_analysis_is_pending() {
    init_test_logging();
    let (estimator, gate) = GatedEstimator::gated([Ok(analysis("Dinner", vec![rice()]))]);
    let session = Arc::new(MealSession::new(estimator));
    let existing = session.add(egg()).await.unwrap();

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.analyze_image(&photo_request()).await }
    });
    wait_until_busy(&session).await;

    assert_eq!(
        session.update(existing, ItemUpdate::Quantity(4.0)).await,
        Err(SessionError::Busy)
    );
    assert_eq!(
        session.set_displayed_quantity(existing, 4.0).await,
        Err(SessionError::Busy)
    );
    assert_eq!(session.remove(existing).await, Err(SessionError::Busy));
    assert_eq!(session.add_placeholder().await, Err(SessionError::Busy));

    // Reads stay available
    assert_close(session.totals().await.protein, 12.0);
    assert_eq!(session.views().await.len(), 1);

    gate.notify_one();
    pending.await.unwrap().unwrap();
    assert_eq!(session.items().await[0].item, rice());
    assert!(session.add_placeholder().await.is_ok());
}

#[tokio::test]
async fn test_guard_released_after_failure() {
    let estimator = GatedEstimator::immediate([
        Err(EstimatorError::transient_call("timeout")),
        Ok(analysis("Meal", vec![egg()])),
    ]);
    let session = MealSession::new(estimator);
    session.add(rice()).await.unwrap();

    assert!(session.recalculate().await.is_err());
    assert!(!session.is_busy());
    assert!(session.recalculate().await.is_ok());
}

// ============================================================================
// Edits
// ============================================================================

#[tokio::test]
async fn test_set_displayed_quantity_scales_bulk_units() {
    let session = MealSession::new(GatedEstimator::immediate([]));
    let rice_id = session.add(rice()).await.unwrap();
    let egg_id = session.add(egg()).await.unwrap();

    assert!(session.set_displayed_quantity(rice_id, 150.0).await.unwrap());
    assert!(session.set_displayed_quantity(egg_id, 3.0).await.unwrap());

    let items = session.items().await;
    assert_close(items[0].item.quantity, 1.5);
    assert_close(items[1].item.quantity, 3.0);

    let totals = session.totals().await;
    assert_close(totals.protein, 4.05 + 18.0);
    assert_close(totals.calories, 195.0 + 210.0);
}

#[tokio::test]
async fn test_edits_on_unknown_ids_are_noops() {
    let session = MealSession::new(GatedEstimator::immediate([]));
    let id = session.add(egg()).await.unwrap();
    assert!(session.remove(id).await.unwrap());

    assert!(!session.remove(id).await.unwrap());
    assert!(!session.set_displayed_quantity(id, 2.0).await.unwrap());
    assert!(!session
        .update(id, ItemUpdate::Unit("1 cup".to_owned()))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_non_finite_edit_is_rejected() {
    let session = MealSession::new(GatedEstimator::immediate([]));
    let id = session.add(egg()).await.unwrap();

    let error = session
        .set_displayed_quantity(id, f64::NAN)
        .await
        .unwrap_err();
    assert!(matches!(error, SessionError::Ledger(_)));
    assert_close(session.items().await[0].item.quantity, 2.0);
}

#[test]
fn test_session_errors_map_to_app_codes() {
    assert_eq!(
        AppError::from(SessionError::Busy).code,
        ErrorCode::ResourceLocked
    );
    assert_eq!(
        AppError::from(SessionError::Estimator(EstimatorError::parse("bad"))).code,
        ErrorCode::InvalidFormat
    );
    assert_eq!(
        AppError::from(SessionError::Estimator(EstimatorError::no_input("none"))).code,
        ErrorCode::MissingRequiredField
    );
}
