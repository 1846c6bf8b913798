//! Linefold - Multiline
//!
//! Regex-driven coalescing of single log lines into multi-line entries.
//!
//! # Overview
//!
//! Log producers emit one line at a time, but many logical records span
//! several lines: stack traces, continuation-marked shell output, grouped
//! transaction logs, pretty-printed JSON documents. The
//! [`MultilineParser`] sits between a line source and a downstream
//! [`EntryHandler`](linefold_pipeline::EntryHandler) and reassembles those
//! records before handing them on:
//!
//! ```text
//! (labels, timestamp, line) → [MultilineParser] → (labels, timestamp, entry)
//! ```
//!
//! # Modes
//!
//! The parser's behaviour is selected by [`Mode`]:
//!
//! | Mode | Rule |
//! |------|------|
//! | `newline` | a line matching `expression` opens a new entry; everything else is appended |
//! | `continue` | a line whose `expression` captures are non-empty continues the entry; the first unmarked line terminates it |
//! | `group` | lines are grouped by the key formed from `expression`'s capture groups; a key change closes the entry |
//! | `unordered_group` | like `group`, but any number of keys accumulate concurrently; entries leave via the idle flusher |
//! | `json` | a relaxed extractor balances `{…}` across lines, tolerating garbage, nested objects, and quoted braces |
//!
//! Buffered entries never wait forever: a background flusher emits any entry
//! whose first line is older than `max_idle_duration`.
//!
//! # Example
//!
//! ```ignore
//! use linefold_multiline::{Mode, MultilineConfig, MultilineParser};
//! use linefold_pipeline::CollectHandler;
//! use std::sync::Arc;
//!
//! let config = MultilineConfig::new(Mode::Continue).with_expression(r"(.*)\\$");
//! let collect = Arc::new(CollectHandler::new());
//! let parser = MultilineParser::new(Some(&config), Some(collect.clone()))?;
//!
//! parser.handle(&labels, ts, r"event \").await?;
//! parser.handle(&labels, ts, "one").await?;
//! parser.stop().await?;
//! assert_eq!(collect.lines(), vec!["event one"]);
//! ```

mod config;
mod entry;
mod error;
mod json;
mod metrics;
mod modes;
mod parser;
mod project;

pub use config::{Mode, MultilineConfig, DEFAULT_MAX_IDLE_DURATION};
pub use error::ConfigError;
pub use metrics::{MetricsSnapshot, ParserMetrics};
pub use parser::MultilineParser;
pub use project::{disjoint, selection};
