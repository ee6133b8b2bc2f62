//! Progress tracking for a grab in flight

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Point-in-time view of [`GrabProgress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

impl ProgressSnapshot {
    pub fn succeeded(&self) -> usize {
        self.completed.saturating_sub(self.failed)
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}

/// Counters updated by concurrently running tasks. Both counters only grow
/// between two calls to [`GrabProgress::begin`].
#[derive(Debug, Default)]
pub struct GrabProgress {
    total: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl GrabProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total: AtomicUsize::new(total),
            ..Self::default()
        }
    }

    /// Announce the number of tasks about to run and clear the counters of
    /// any earlier grab
    pub fn begin(&self, total: usize) {
        self.failed.store(0, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    /// Record one finished task and return its completion position (1-based)
    pub fn record(&self, success: bool) -> usize {
        let position = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if !success {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        position
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        // failed is bumped after completed, so reading it first keeps failed <= completed
        let failed = self.failed();
        ProgressSnapshot {
            total: self.total(),
            completed: self.completed(),
            failed,
        }
    }
}
