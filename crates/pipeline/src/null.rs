//! Null handler - discards all entries
//!
//! Stands in for a missing downstream: accepts every entry and never fails.
//! Stages constructed without a downstream handler are wired to this so their
//! emission paths stay unconditional.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{EntryHandler, HandleError, Labels};

/// Entry handler that accepts and discards everything
#[derive(Debug, Default)]
pub struct NullHandler {
    discarded: AtomicU64,
}

impl NullHandler {
    /// Create a new null handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries discarded so far
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EntryHandler for NullHandler {
    async fn handle(
        &self,
        _labels: &Labels,
        _timestamp: DateTime<Utc>,
        _line: &str,
    ) -> Result<(), HandleError> {
        self.discarded.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
