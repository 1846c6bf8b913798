//! Line-oriented coalescing modes
//!
//! The four line-driven disciplines: `newline`, `continue`, `group` and
//! `unordered_group`. Each handler is a pure transition over the parser's
//! locked state: it mutates the buffer(s) and pushes completed entries onto
//! `out`, and the coordinator forwards them downstream, in order, while
//! still holding the lock.

use chrono::{DateTime, Utc};
use regex::Regex;

use linefold_pipeline::Labels;

use crate::entry::MultilineEntry;
use crate::project::selection;

#[cfg(test)]
#[path = "modes_test.rs"]
mod tests;

/// A completed entry ready for the downstream handler
#[derive(Debug)]
pub(crate) struct Emission {
    pub(crate) labels: Labels,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) line: String,
}

impl From<&MultilineEntry> for Emission {
    fn from(buffer: &MultilineEntry) -> Self {
        Self {
            labels: buffer.labels.clone(),
            timestamp: buffer.timestamp,
            line: buffer.text.clone(),
        }
    }
}

/// Immutable per-parser inputs shared by every handler invocation
pub(crate) struct ModeContext<'a> {
    pub(crate) expression: &'a Regex,
    pub(crate) first: Option<&'a Regex>,
    pub(crate) next: Option<&'a Regex>,
    pub(crate) separator: &'a str,
}

impl ModeContext<'_> {
    /// Projection for json appends: the first-line expression while the
    /// buffer is empty, the next-line expression afterwards
    pub(crate) fn selection_dynamic(&self, buffer: &MultilineEntry, s: &str) -> String {
        let expression = if buffer.is_idle() { self.first } else { self.next };
        selection(expression, s)
    }
}

/// `newline` mode: a line matching the expression opens a new entry;
/// everything else is appended to the current one
pub(crate) fn handle_newline(
    cx: &ModeContext<'_>,
    buffer: &mut MultilineEntry,
    labels: &Labels,
    timestamp: DateTime<Utc>,
    line: &str,
    out: &mut Vec<Emission>,
) {
    if !cx.expression.is_match(line) {
        // not an opener: append, projected through `next` when configured
        buffer.append(labels, &selection(cx.next, line), cx.separator);
    } else {
        // opener: hand off the previous entry, then start over
        if !buffer.is_idle() {
            out.push(Emission::from(&*buffer));
        }
        buffer.init(labels, timestamp, selection(cx.first, line));
    }
}

/// `continue` mode: a line whose expression captures are non-empty carries a
/// continuation mark; the first unmarked line terminates the entry
pub(crate) fn handle_continue(
    cx: &ModeContext<'_>,
    buffer: &mut MultilineEntry,
    labels: &Labels,
    timestamp: DateTime<Utc>,
    line: &str,
    out: &mut Vec<Emission>,
) {
    let picked = selection(Some(cx.expression), line);
    if !picked.is_empty() {
        if !buffer.is_idle() {
            buffer.append(labels, &selection(cx.next, &picked), cx.separator);
        } else {
            buffer.init(labels, timestamp, selection(cx.first, &picked));
        }
    } else if !buffer.is_idle() {
        // terminator: the unmarked line still belongs to the entry
        buffer.append(labels, &selection(cx.next, line), cx.separator);
        out.push(Emission::from(&*buffer));
        buffer.reset();
    } else {
        // standalone line, pass through untouched
        out.push(Emission {
            labels: labels.clone(),
            timestamp,
            line: line.to_string(),
        });
    }
}

/// `group` mode: lines sharing the key formed by the expression's capture
/// groups belong to one entry; a key change closes it
pub(crate) fn handle_group(
    cx: &ModeContext<'_>,
    buffer: &mut MultilineEntry,
    labels: &Labels,
    timestamp: DateTime<Utc>,
    line: &str,
    out: &mut Vec<Emission>,
) {
    let (key, residual) = crate::project::disjoint(cx.expression, line);
    if buffer.key == key {
        // same group: append the line with the key elided, unless a
        // next-line projection overrides
        let text = match cx.next {
            Some(re) => selection(Some(re), line),
            None => residual,
        };
        buffer.append(labels, &text, cx.separator);
    } else {
        if !buffer.is_idle() {
            out.push(Emission::from(&*buffer));
        }
        buffer.init(labels, timestamp, selection(cx.first, line));
        buffer.key = key;
    }
}

/// `unordered_group` mode: like `group`, but entries for any number of keys
/// accumulate concurrently; completed entries leave only via the flusher
pub(crate) fn handle_unordered_group(
    cx: &ModeContext<'_>,
    tracks: &mut Vec<MultilineEntry>,
    labels: &Labels,
    timestamp: DateTime<Utc>,
    line: &str,
) {
    let (key, residual) = crate::project::disjoint(cx.expression, line);
    let buffer = fetch(tracks, &key);
    if !buffer.is_idle() {
        let text = match cx.next {
            Some(re) => selection(Some(re), line),
            None => residual,
        };
        buffer.append(labels, &text, cx.separator);
    } else {
        buffer.init(labels, timestamp, selection(cx.first, line));
        buffer.key = key;
    }
}

/// Find the buffer tracking `key`, creating it at the end of the list on a
/// miss (insertion order is the forced-drain emission order)
fn fetch<'a>(tracks: &'a mut Vec<MultilineEntry>, key: &str) -> &'a mut MultilineEntry {
    match tracks.iter().position(|t| t.key == key) {
        Some(i) => &mut tracks[i],
        None => {
            tracks.push(MultilineEntry::new(key));
            let end = tracks.len() - 1;
            &mut tracks[end]
        }
    }
}
