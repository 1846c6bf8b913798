//! Accumulating entry buffer
//!
//! One `MultilineEntry` holds the lines coalesced so far for a single
//! logical entry: the merged labels, the first line's timestamp, the text
//! accumulated with separators, and the wall-clock instant buffering began
//! (which the idle flusher measures against).

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

use linefold_pipeline::Labels;

#[cfg(test)]
#[path = "entry_test.rs"]
mod tests;

/// Buffer for one in-progress multiline entry
///
/// Invariant: `lines == 0` exactly when `text` is empty; an idle buffer holds
/// no partial state except its `key`, which survives [`reset`](Self::reset)
/// so the buffer keeps its identity in key-indexed storage.
#[derive(Debug)]
pub(crate) struct MultilineEntry {
    /// Labels merged across all buffered lines; appended-line values win
    pub(crate) labels: Labels,

    /// Timestamp of the first buffered line; never refreshed on append
    pub(crate) timestamp: DateTime<Utc>,

    /// Instant the first line was buffered; the flusher's freshness anchor
    pub(crate) enroll_time: Instant,

    /// Group key routing lines to this buffer; empty for single-track modes
    pub(crate) key: String,

    /// Accumulated entry text
    pub(crate) text: String,

    /// Number of lines accumulated in `text`
    pub(crate) lines: usize,
}

impl MultilineEntry {
    /// Create an idle buffer with the given group key
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self {
            labels: Labels::new(),
            timestamp: DateTime::<Utc>::MIN_UTC,
            enroll_time: Instant::now(),
            key: key.into(),
            text: String::new(),
            lines: 0,
        }
    }

    /// Start the buffer over with exactly one line
    ///
    /// Clones the labels, records the line's timestamp as the entry
    /// timestamp, and stamps the enroll time.
    pub(crate) fn init(
        &mut self,
        labels: &Labels,
        timestamp: DateTime<Utc>,
        text: impl Into<String>,
    ) {
        self.labels = labels.clone();
        self.timestamp = timestamp;
        self.text = text.into();
        self.lines = 1;
        self.enroll_time = Instant::now();
    }

    /// Append a line, merging its labels and joining with `separator`
    pub(crate) fn append(&mut self, labels: &Labels, text: &str, separator: &str) {
        self.labels.merge(labels);
        self.text = join(&self.text, separator, text);
        self.lines += 1;
    }

    /// Clear all buffered state except the group key
    pub(crate) fn reset(&mut self) {
        self.labels.clear();
        self.text.clear();
        self.lines = 0;
    }

    /// Whether the buffer holds no lines
    pub(crate) fn is_idle(&self) -> bool {
        self.lines == 0
    }

    /// Whether the first buffered line is older than `max_idle`
    pub(crate) fn older_than(&self, max_idle: Duration) -> bool {
        self.enroll_time.elapsed() > max_idle
    }
}

/// Join two fragments, inserting `separator` only when `a` is non-empty
pub(crate) fn join(a: &str, separator: &str, b: &str) -> String {
    if a.is_empty() {
        b.to_string()
    } else {
        let mut joined = String::with_capacity(a.len() + separator.len() + b.len());
        joined.push_str(a);
        joined.push_str(separator);
        joined.push_str(b);
        joined
    }
}
