// ABOUTME: Unit tests for the LLM provider abstraction layer
// ABOUTME: Tests capabilities, message construction, prompts, and the Gemini provider surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Test files don't require documentation - this is a rustc lint (not clippy)
#![allow(missing_docs)]

use protein_tracker::config::EstimatorConfig;
use protein_tracker::llm::prompts::{
    analysis_prompt, get_meal_estimator_system_prompt, recalculation_prompt,
};
use protein_tracker::llm::{
    ChatMessage, ChatRequest, GeminiProvider, ImageAttachment, LlmCapabilities, LlmProvider,
    MessageRole,
};

// ============================================================================
// LlmCapabilities Tests
// ============================================================================

#[test]
fn test_capabilities_text_only() {
    let caps = LlmCapabilities::text_only();
    assert!(caps.supports_system_messages());
    assert!(!caps.supports_vision());
    assert!(!caps.supports_json_mode());
}

#[test]
fn test_capabilities_multimodal() {
    let caps = LlmCapabilities::multimodal();
    assert!(caps.supports_vision());
    assert!(caps.supports_json_mode());
    assert!(caps.supports_system_messages());
}

// ============================================================================
// ChatMessage / ChatRequest Tests
// ============================================================================

#[test]
fn test_chat_message_constructors() {
    let system = ChatMessage::system("You are strict");
    assert_eq!(system.role, MessageRole::System);
    assert!(system.images.is_empty());

    let user = ChatMessage::user_with_image("Analyze", ImageAttachment::new("image/png", vec![0; 8]));
    assert_eq!(user.role, MessageRole::User);
    assert_eq!(user.images.len(), 1);
}

#[test]
fn test_image_attachment_debug_hides_bytes() {
    let attachment = ImageAttachment::new("image/jpeg", vec![7; 1024]);
    let debug = format!("{attachment:?}");
    assert!(debug.contains("1024"));
    assert!(!debug.contains("7, 7"));
}

#[test]
fn test_chat_request_builder() {
    let request = ChatRequest::new(vec![ChatMessage::user("1x banana")])
        .with_model("gemini-2.5-flash")
        .with_temperature(0.2)
        .with_max_tokens(1024)
        .with_json_output();

    assert_eq!(request.model.as_deref(), Some("gemini-2.5-flash"));
    assert_eq!(request.temperature, Some(0.2));
    assert_eq!(request.max_tokens, Some(1024));
    assert!(request.json_output);
    assert!(!request.has_images());

    let with_image = ChatRequest::new(vec![ChatMessage::user_with_image(
        "look",
        ImageAttachment::new("image/png", vec![1]),
    )]);
    assert!(with_image.has_images());
}

// ============================================================================
// Prompt Tests
// ============================================================================

#[test]
fn test_system_prompt_carries_unit_and_hydration_rules() {
    let prompt = get_meal_estimator_system_prompt();
    assert!(prompt.contains("THE NATURAL UNIT RULE"));
    assert!(prompt.contains("Calibrate baseProtein for the COOKED state"));
    assert!(prompt.contains("default to 1"));
    assert!(prompt.contains("\"baseCalories\": number"));
}

#[test]
fn test_user_prompts() {
    assert_eq!(
        analysis_prompt(Some("thali")),
        "Analyze this food image. USER CONTEXT: \"thali\""
    );
    assert!(recalculation_prompt(&["1x Dal".to_owned()]).contains("[\"1x Dal\"]"));
}

// ============================================================================
// GeminiProvider Tests
// ============================================================================

#[test]
fn test_gemini_provider_surface() {
    let provider = GeminiProvider::from_config(
        &EstimatorConfig::new("secret-key").with_model("gemini-2.5-pro"),
    );
    assert_eq!(provider.name(), "gemini");
    assert_eq!(provider.display_name(), "Google Gemini");
    assert_eq!(provider.default_model(), "gemini-2.5-pro");
    assert!(provider.capabilities().supports_vision());

    let debug = format!("{provider:?}");
    assert!(!debug.contains("secret-key"));
    assert!(debug.contains("[REDACTED]"));
}

#[test]
fn test_gemini_provider_default_model() {
    let provider = GeminiProvider::new("key");
    assert_eq!(provider.default_model(), "gemini-2.5-flash");
}
