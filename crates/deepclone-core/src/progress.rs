//! Progress reporting
//!
//! Three monotonically increasing counters (references discovered, clones
//! created, references updated) shared by every in-flight unit of work. After
//! each successful unit the new count is pushed to a [`ProgressReporter`].
//! The counts are advisory telemetry for a live progress display.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives counter updates
///
/// Called synchronously from inside the phases, so implementations must be
/// cheap and must not block.
pub trait ProgressReporter: Send + Sync {
    /// A record was added to the reference closure
    fn on_discovered(&self, _count: usize) {}

    /// A clone was created
    fn on_cloned(&self, _count: usize) {}

    /// A clone's rewritten references were persisted
    fn on_updated(&self, _count: usize) {}
}

/// Reporter that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// Reporter that emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn on_discovered(&self, count: usize) {
        tracing::debug!(count, "references discovered");
    }

    fn on_cloned(&self, count: usize) {
        tracing::debug!(count, "clones created");
    }

    fn on_updated(&self, count: usize) {
        tracing::debug!(count, "references updated");
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Records in the reference closure
    pub discovered: usize,
    /// Clones created
    pub cloned: usize,
    /// Clones whose references were persisted
    pub updated: usize,
}

/// Shared atomic counters
#[derive(Debug, Default)]
pub struct ProgressCounters {
    discovered: AtomicUsize,
    cloned: AtomicUsize,
    updated: AtomicUsize,
}

impl ProgressCounters {
    /// Create zeroed counters
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one discovered reference and report the new count
    pub fn discovered(&self, reporter: &dyn ProgressReporter) -> usize {
        let count = self.discovered.fetch_add(1, Ordering::SeqCst) + 1;
        reporter.on_discovered(count);
        count
    }

    /// Record one created clone and report the new count
    pub fn cloned(&self, reporter: &dyn ProgressReporter) -> usize {
        let count = self.cloned.fetch_add(1, Ordering::SeqCst) + 1;
        reporter.on_cloned(count);
        count
    }

    /// Record one persisted update and report the new count
    pub fn updated(&self, reporter: &dyn ProgressReporter) -> usize {
        let count = self.updated.fetch_add(1, Ordering::SeqCst) + 1;
        reporter.on_updated(count);
        count
    }

    /// Current values
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            discovered: self.discovered.load(Ordering::SeqCst),
            cloned: self.cloned.load(Ordering::SeqCst),
            updated: self.updated.load(Ordering::SeqCst),
        }
    }
}
