//! Linefold - Pipeline
//!
//! Shared vocabulary for the linefold pipeline: label sets, the entry
//! handler capability, error aggregation, and a few stock handlers.
//!
//! # Overview
//!
//! Every stage in linefold consumes and produces *entries*: a label set, a
//! timestamp, and a line of text. Stages are chained by handing each stage a
//! reference to the next handler:
//!
//! ```text
//! [Source] → (labels, timestamp, line) → [Stage] → [Stage'] → ... → [Output]
//! ```
//!
//! # Design Principles
//!
//! - **Synchronous handoff**: a stage observes its downstream's completion
//!   (and error) as part of its own `handle` call. There are no internal
//!   queues between stages.
//! - **Thread-safe**: handlers may be called concurrently and must be
//!   `Send + Sync`.
//! - **Error accumulation**: a stage that performs several downstream calls
//!   for one input reports every failure, not just the first (see
//!   [`MultiError`]).
//!
//! # Example
//!
//! ```ignore
//! use linefold_pipeline::{CollectHandler, EntryHandler, Labels};
//!
//! let collect = CollectHandler::new();
//! collect.handle(&Labels::new(), chrono::Utc::now(), "hello").await?;
//! assert_eq!(collect.lines(), vec!["hello"]);
//! ```

mod collect;
mod error;
mod labels;
mod null;
mod stdout;

pub use collect::{CollectHandler, CollectedEntry};
pub use error::{HandleError, MultiError};
pub use labels::Labels;
pub use null::NullHandler;
pub use stdout::StdoutHandler;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Capability required of a downstream entry handler
///
/// Implementors receive one logical log entry per call: a label set, the
/// timestamp of the entry, and its (possibly multi-line) text.
///
/// # Contract
///
/// - `handle` is called synchronously from the producing stage; a slow
///   handler slows the producer.
/// - Handlers must not call back into the stage that invoked them. Stages
///   hold their internal lock across the `handle` call.
#[async_trait]
pub trait EntryHandler: Send + Sync {
    /// Consume one entry, returning an error if it could not be handled
    async fn handle(
        &self,
        labels: &Labels,
        timestamp: DateTime<Utc>,
        line: &str,
    ) -> Result<(), HandleError>;
}
