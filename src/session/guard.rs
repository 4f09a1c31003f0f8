// ABOUTME: Single-flight guard shared by photo analysis and recalculation
// ABOUTME: Releases the in-flight flag on drop so every exit path clears it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::atomic::{AtomicBool, Ordering};

/// Flag marking an estimator operation as in flight
#[derive(Debug, Default)]
pub(super) struct InFlight(AtomicBool);

impl InFlight {
    /// Claim the flag, or `None` if another operation holds it
    pub(super) fn try_begin(&self) -> Option<OperationGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| OperationGuard(&self.0))
    }

    pub(super) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Held for the duration of one estimator operation
#[derive(Debug)]
pub(super) struct OperationGuard<'a>(&'a AtomicBool);

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
