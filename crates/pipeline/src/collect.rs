//! Collect handler - records entries for inspection
//!
//! Test collaborator that appends every handled entry to an in-memory list.
//! Used throughout the workspace's tests to assert on what a stage emitted,
//! and handy for ad-hoc debugging of a stage's output.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

use crate::{EntryHandler, HandleError, Labels};

/// One recorded entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedEntry {
    pub labels: Labels,
    pub timestamp: DateTime<Utc>,
    pub line: String,
}

/// Entry handler that stores everything it receives
#[derive(Debug, Default)]
pub struct CollectHandler {
    entries: Mutex<Vec<CollectedEntry>>,
}

impl CollectHandler {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, in arrival order
    pub fn entries(&self) -> Vec<CollectedEntry> {
        self.entries.lock().expect("collect handler poisoned").clone()
    }

    /// Just the line text of every recorded entry, in arrival order
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .lock()
            .expect("collect handler poisoned")
            .iter()
            .map(|e| e.line.clone())
            .collect()
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.lock().expect("collect handler poisoned").len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EntryHandler for CollectHandler {
    async fn handle(
        &self,
        labels: &Labels,
        timestamp: DateTime<Utc>,
        line: &str,
    ) -> Result<(), HandleError> {
        self.entries
            .lock()
            .expect("collect handler poisoned")
            .push(CollectedEntry {
                labels: labels.clone(),
                timestamp,
                line: line.to_string(),
            });
        Ok(())
    }
}
