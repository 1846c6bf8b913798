//! Linefold collector - coalesce multiline log entries from stdin
//!
//! # Usage
//!
//! ```bash
//! # Stack traces: every line not starting with '[' continues the entry
//! kubectl logs app | linefold --mode newline --expression '^\[' --separator $'\n'
//!
//! # Shell-style continuations
//! linefold --mode continue --expression '(.*)\\$' --separator ' ' < session.log
//!
//! # Pretty-printed JSON documents mixed into plain output
//! linefold --mode json --separator $'\n' < app.log
//! ```
//!
//! Reads one log line per stdin line, reassembles multiline entries, and
//! prints each completed entry to stdout. Stopping the input (EOF) drains
//! everything still buffered.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use linefold_multiline::{Mode, MultilineConfig, MultilineParser};
use linefold_pipeline::{EntryHandler, Labels, StdoutHandler};

/// Coalesce multiline log entries from stdin
#[derive(Parser, Debug)]
#[command(name = "linefold")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Parsing mode (newline, continue, group, unordered_group, json)
    #[arg(short, long)]
    mode: String,

    /// Primary regular expression for the selected mode
    #[arg(short, long, default_value = "")]
    expression: String,

    /// Projection applied to the first line of each entry
    #[arg(long)]
    first: Option<String>,

    /// Projection applied to appended lines
    #[arg(long)]
    next: Option<String>,

    /// Text inserted between the lines of an entry
    #[arg(short, long, default_value = "")]
    separator: String,

    /// How long an entry may wait for its next line ("5s", "200ms"; "0s" disables)
    #[arg(long, default_value = "5s")]
    max_idle_duration: String,

    /// Prefix each entry with its timestamp and labels
    #[arg(long)]
    annotate: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let mode: Mode = cli.mode.parse().context("invalid --mode")?;
    let mut config = MultilineConfig::new(mode)
        .with_expression(cli.expression.as_str())
        .with_separator(cli.separator.as_str())
        .with_max_idle_duration_str(&cli.max_idle_duration)
        .context("invalid --max-idle-duration")?;
    config.first = cli.first;
    config.next = cli.next;

    let output: Arc<dyn EntryHandler> = if cli.annotate {
        Arc::new(StdoutHandler::annotated())
    } else {
        Arc::new(StdoutHandler::new())
    };
    let parser = MultilineParser::new(Some(&config), Some(output))
        .context("invalid multiline configuration")?;

    info!(%mode, "linefold collector started");

    let labels = Labels::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if let Err(error) = parser.handle(&labels, chrono::Utc::now(), &line).await {
            debug!(%error, "downstream handler failed");
        }
    }

    parser.stop().await.context("draining buffered entries")?;

    let snapshot = parser.metrics().snapshot();
    info!(
        lines = snapshot.lines_handled,
        entries = snapshot.entries_emitted,
        idle_flushes = snapshot.idle_flushes,
        "linefold collector finished"
    );

    Ok(())
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("warn"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
