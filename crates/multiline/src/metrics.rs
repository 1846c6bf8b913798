//! Parser metrics
//!
//! Lock-free counters recorded by the parser and the flusher. Cheap enough
//! to update on every line; read via [`ParserMetrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one multiline parser
#[derive(Debug, Default)]
pub struct ParserMetrics {
    /// Input lines handled
    lines_handled: AtomicU64,

    /// Entries handed to the downstream handler
    entries_emitted: AtomicU64,

    /// Entries emitted by the idle flusher rather than a natural terminator
    idle_flushes: AtomicU64,

    /// Downstream handler calls that returned an error
    sink_errors: AtomicU64,
}

impl ParserMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_line(&self) {
        self.lines_handled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_emitted(&self) {
        self.entries_emitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_idle_flush(&self) {
        self.idle_flushes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_handled: self.lines_handled.load(Ordering::Relaxed),
            entries_emitted: self.entries_emitted.load(Ordering::Relaxed),
            idle_flushes: self.idle_flushes.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of [`ParserMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lines_handled: u64,
    pub entries_emitted: u64,
    pub idle_flushes: u64,
    pub sink_errors: u64,
}
