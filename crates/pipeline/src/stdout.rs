//! Stdout handler - human-readable output
//!
//! Terminal output for the collector binary and for quick local runs.
//! Multi-line entries are printed as-is; an optional prefix carries the
//! timestamp and label set.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{EntryHandler, HandleError, Labels};

/// Entry handler that writes entries to stdout
#[derive(Debug, Default)]
pub struct StdoutHandler {
    /// Prefix each entry with its timestamp and labels
    annotate: bool,

    /// Entries written so far
    written: AtomicU64,
}

impl StdoutHandler {
    /// Create a handler that prints entry text only
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handler that prefixes each entry with timestamp and labels
    pub fn annotated() -> Self {
        Self {
            annotate: true,
            written: AtomicU64::new(0),
        }
    }

    /// Number of entries written so far
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EntryHandler for StdoutHandler {
    async fn handle(
        &self,
        labels: &Labels,
        timestamp: DateTime<Utc>,
        line: &str,
    ) -> Result<(), HandleError> {
        let mut out = std::io::stdout().lock();
        if self.annotate {
            writeln!(
                out,
                "{} {} {}",
                timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                labels,
                line
            )?;
        } else {
            writeln!(out, "{}", line)?;
        }
        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
