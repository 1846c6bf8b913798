//! Multiline parser coordinator
//!
//! Owns the compiled expressions, the buffer state behind a single mutex,
//! the downstream handler, and the idle flusher task.
//!
//! # Concurrency
//!
//! Producers may call [`MultilineParser::handle`] from any number of tasks;
//! one mutex serializes every mutation of buffer state *and* every downstream
//! call, so concurrent producers observe one total order and downstream
//! handlers never see interleaved emissions. The flusher is an independent
//! task contending for the same mutex.
//!
//! # Lifecycle
//!
//! Construction compiles all regexes and spawns the flusher when the idle
//! bound is positive (this requires an ambient Tokio runtime). The parser
//! runs until [`stop`](MultilineParser::stop), which cancels the flusher,
//! waits for it to exit, and performs a final forced drain.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use linefold_pipeline::{EntryHandler, HandleError, Labels, MultiError, NullHandler};

use crate::config::{Mode, MultilineConfig, DEFAULT_JSON_EXPRESSION};
use crate::entry::MultilineEntry;
use crate::error::ConfigError;
use crate::json::{handle_json, JsonCursor};
use crate::metrics::ParserMetrics;
use crate::modes::{
    handle_continue, handle_group, handle_newline, handle_unordered_group, Emission, ModeContext,
};

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;

/// Mutable parser state, guarded by one mutex
#[derive(Debug)]
struct ParserState {
    /// The sole buffer of the single-track modes (and the document buffer of
    /// json mode)
    single: MultilineEntry,

    /// Key-indexed buffers of unordered_group mode, in insertion order
    tracks: Vec<MultilineEntry>,

    /// Json scanner position, carried across lines
    json: JsonCursor,
}

impl ParserState {
    fn new() -> Self {
        Self {
            single: MultilineEntry::new(""),
            tracks: Vec::new(),
            json: JsonCursor::new(),
        }
    }
}

/// Handle on the spawned flusher task
struct Flusher {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Coalesces single log lines into multiline entries
///
/// See the crate docs for the mode semantics. Constructed from a
/// [`MultilineConfig`] and an optional downstream handler; a missing
/// downstream is replaced by a [`NullHandler`].
pub struct MultilineParser {
    mode: Mode,
    expression: Regex,
    first: Option<Regex>,
    next: Option<Regex>,
    separator: String,
    max_idle: Duration,
    sink: Arc<dyn EntryHandler>,
    metrics: Arc<ParserMetrics>,
    state: Arc<Mutex<ParserState>>,
    flusher: Mutex<Option<Flusher>>,
}

impl std::fmt::Debug for MultilineParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultilineParser")
            .field("mode", &self.mode)
            .field("expression", &self.expression)
            .field("first", &self.first)
            .field("next", &self.next)
            .field("separator", &self.separator)
            .field("max_idle", &self.max_idle)
            .finish_non_exhaustive()
    }
}

impl MultilineParser {
    /// Build a parser from configuration
    ///
    /// `config` is `None` when the enclosing configuration has no multiline
    /// section; that is an error rather than a silent pass-through stage.
    /// When the idle bound is positive the flusher task is spawned
    /// immediately, so this must run inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails on a missing or invalid configuration: uncompilable
    /// `expression` / `first` / `next`, an unsupported mode reaching
    /// validation, a missing expression outside json mode, or a zero idle
    /// bound in a mode that requires one.
    pub fn new(
        config: Option<&MultilineConfig>,
        sink: Option<Arc<dyn EntryHandler>>,
    ) -> Result<Self, ConfigError> {
        let config = config.ok_or(ConfigError::Empty)?;
        config.validate()?;

        let expression = if config.expression.is_empty() {
            // validate() leaves this reachable only in json mode, which
            // never consults the expression for document boundaries
            Regex::new(DEFAULT_JSON_EXPRESSION).map_err(ConfigError::Expression)?
        } else {
            Regex::new(&config.expression).map_err(ConfigError::Expression)?
        };
        let first = compile_optional(config.first.as_deref()).map_err(ConfigError::First)?;
        let next = compile_optional(config.next.as_deref()).map_err(ConfigError::Next)?;

        let sink = sink.unwrap_or_else(|| {
            warn!("multiline downstream handler is not defined");
            Arc::new(NullHandler::new())
        });

        let metrics = Arc::new(ParserMetrics::new());
        let state = Arc::new(Mutex::new(ParserState::new()));

        let flusher = if config.max_idle_duration.is_zero() {
            warn!(mode = %config.mode, "multiline flusher disabled");
            None
        } else {
            Some(spawn_flusher(
                Arc::clone(&state),
                Arc::clone(&sink),
                Arc::clone(&metrics),
                config.max_idle_duration,
            ))
        };

        Ok(Self {
            mode: config.mode,
            expression,
            first,
            next,
            separator: config.separator.clone(),
            max_idle: config.max_idle_duration,
            sink,
            metrics,
            state,
            flusher: Mutex::new(flusher),
        })
    }

    /// Feed one input line
    ///
    /// Runs the configured mode handler and forwards any completed entries
    /// downstream before returning. Downstream failures are collected and
    /// reported together; an early failure never suppresses the remaining
    /// emissions of the same line.
    pub async fn handle(
        &self,
        labels: &Labels,
        timestamp: DateTime<Utc>,
        line: &str,
    ) -> Result<(), HandleError> {
        let mut state = self.state.lock().await;
        self.metrics.record_line();

        let cx = self.context();
        let mut out = Vec::new();
        let ParserState {
            single,
            tracks,
            json,
        } = &mut *state;

        match self.mode {
            Mode::Newline => handle_newline(&cx, single, labels, timestamp, line, &mut out),
            Mode::Continue => handle_continue(&cx, single, labels, timestamp, line, &mut out),
            Mode::Group => handle_group(&cx, single, labels, timestamp, line, &mut out),
            Mode::UnorderedGroup => handle_unordered_group(&cx, tracks, labels, timestamp, line),
            Mode::Json => handle_json(&cx, json, single, labels, timestamp, line, &mut out),
        }

        let mut errs = MultiError::new();
        for emission in out {
            self.metrics.record_emitted();
            let result = self
                .sink
                .handle(&emission.labels, emission.timestamp, &emission.line)
                .await;
            if result.is_err() {
                self.metrics.record_sink_error();
            }
            errs.add(result);
        }
        errs.into_result()
    }

    /// Force the immediate emission of every buffered entry
    pub async fn flush(&self) -> Result<(), HandleError> {
        let mut state = self.state.lock().await;
        drain(&mut state, &self.sink, &self.metrics, self.max_idle, true).await
    }

    /// Stop the flusher and drain all buffered entries
    ///
    /// Idempotent; later calls just perform another (empty) drain.
    pub async fn stop(&self) -> Result<(), HandleError> {
        if let Some(flusher) = self.flusher.lock().await.take() {
            flusher.token.cancel();
            if let Err(error) = flusher.task.await {
                warn!(%error, "multiline flusher task failed");
            }
        }
        self.flush().await
    }

    /// The parser's mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The parser's counters
    pub fn metrics(&self) -> &ParserMetrics {
        &self.metrics
    }

    fn context(&self) -> ModeContext<'_> {
        ModeContext {
            expression: &self.expression,
            first: self.first.as_ref(),
            next: self.next.as_ref(),
            separator: &self.separator,
        }
    }
}

fn compile_optional(pattern: Option<&str>) -> Result<Option<Regex>, regex::Error> {
    match pattern {
        Some(p) if !p.is_empty() => Ok(Some(Regex::new(p)?)),
        _ => Ok(None),
    }
}

/// Emit every entry that is stale (or, when forced, every entry at all),
/// keeping the rest buffered
///
/// Runs with the state lock held; downstream calls are part of the drain.
/// Idle multi-track buffers are dropped rather than retained, so the track
/// list only ever holds entries with content.
async fn drain(
    state: &mut ParserState,
    sink: &Arc<dyn EntryHandler>,
    metrics: &ParserMetrics,
    max_idle: Duration,
    force: bool,
) -> Result<(), HandleError> {
    let mut emissions = Vec::new();

    let tracks = std::mem::take(&mut state.tracks);
    let mut kept = Vec::with_capacity(tracks.len());
    for track in tracks {
        if track.is_idle() {
            continue;
        }
        if force || track.older_than(max_idle) {
            emissions.push(Emission::from(&track));
        } else {
            kept.push(track);
        }
    }
    state.tracks = kept;

    if !state.single.is_idle() && (force || state.single.older_than(max_idle)) {
        emissions.push(Emission::from(&state.single));
        state.single.reset();
    }

    let mut errs = MultiError::new();
    for emission in emissions {
        metrics.record_emitted();
        if !force {
            metrics.record_idle_flush();
        }
        let result = sink
            .handle(&emission.labels, emission.timestamp, &emission.line)
            .await;
        if result.is_err() {
            metrics.record_sink_error();
        }
        errs.add(result);
    }
    errs.into_result()
}

/// Spawn the periodic drain task
///
/// Ticks at half the idle bound, so an entry is emitted at most one and a
/// half idle bounds after its first line. The first tick fires one full
/// period after start.
fn spawn_flusher(
    state: Arc<Mutex<ParserState>>,
    sink: Arc<dyn EntryHandler>,
    metrics: Arc<ParserMetrics>,
    max_idle: Duration,
) -> Flusher {
    let token = CancellationToken::new();
    let child = token.clone();
    let period = max_idle / 2;

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // an interval's first tick completes immediately; consume it so the
        // first drain waits a full period
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = child.cancelled() => {
                    debug!("multiline flusher stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let mut state = state.lock().await;
                    if let Err(error) =
                        drain(&mut state, &sink, &metrics, max_idle, false).await
                    {
                        debug!(%error, "failed to flush multiline entries");
                    }
                }
            }
        }
    });

    Flusher { token, task }
}
