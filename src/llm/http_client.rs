// ABOUTME: HTTP client construction with configured timeouts for estimator calls
// ABOUTME: Built once at startup and shared by the provider for connection pooling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::warn;

/// Build the HTTP client used for estimator API calls
///
/// Falls back to a default client if the configured builder cannot be
/// constructed (for example when the TLS backend fails to initialize).
#[must_use]
pub fn build_http_client(timeout: Duration, connect_timeout: Duration) -> Client {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}
