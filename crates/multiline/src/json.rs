//! Relaxed JSON document extraction
//!
//! A three-state automaton that pulls `{…}` documents out of a line stream.
//! It is not a JSON parser: it only balances braces while respecting quoted
//! strings and backslash escapes, which lets it recover documents embedded in
//! arbitrary surrounding text (prefixes, array punctuation, trailing noise).

use chrono::{DateTime, Utc};

use linefold_pipeline::Labels;

use crate::entry::MultilineEntry;
use crate::modes::{Emission, ModeContext};

#[cfg(test)]
#[path = "json_test.rs"]
mod tests;

/// Position of the scanner relative to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum DocState {
    /// Between documents; input is discarded until the next `{`
    #[default]
    Regular,
    /// Inside a document, outside any string literal
    InDoc,
    /// Inside a string literal; braces are ordinary characters
    InString,
}

/// Scanner state carried across lines
#[derive(Debug, Default)]
pub(crate) struct JsonCursor {
    pub(crate) state: DocState,
    /// Open-brace depth; zero outside documents
    pub(crate) depth: usize,
}

impl JsonCursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// `json` mode: extract every document completed on this line, buffering any
/// document the line leaves open
pub(crate) fn handle_json(
    cx: &ModeContext<'_>,
    cursor: &mut JsonCursor,
    buffer: &mut MultilineEntry,
    labels: &Labels,
    timestamp: DateTime<Utc>,
    line: &str,
    out: &mut Vec<Emission>,
) {
    let mut rest = line;

    'line: while !rest.is_empty() {
        match cursor.state {
            DocState::Regular => {
                // discard anything before the next opening brace
                let Some(i) = rest.find('{') else {
                    break 'line;
                };
                buffer.init(labels, timestamp, "{");
                rest = &rest[i + 1..];
                cursor.depth = 1;
                cursor.state = DocState::InDoc;
            }
            DocState::InDoc | DocState::InString => {
                // `held` accumulates consumed text not yet appended
                let mut held = String::new();
                loop {
                    let Some(i) = rest.find(['\\', '"', '{', '}']) else {
                        held.push_str(rest);
                        rest = "";
                        break;
                    };
                    // consume through the significant character
                    let mut cut = i + 1;
                    match rest.as_bytes()[i] {
                        b'\\' => {
                            // the escaped character is consumed verbatim; a
                            // backslash ending the line escapes nothing
                            let skipped = rest[cut..].chars().next().map_or(0, char::len_utf8);
                            cut += skipped;
                        }
                        b'"' => {
                            cursor.state = if cursor.state == DocState::InDoc {
                                DocState::InString
                            } else {
                                DocState::InDoc
                            };
                        }
                        b'{' => {
                            if cursor.state == DocState::InDoc {
                                cursor.depth += 1;
                            }
                        }
                        b'}' => {
                            if cursor.state == DocState::InDoc {
                                cursor.depth = cursor.depth.saturating_sub(1);
                                if cursor.depth == 0 {
                                    // document complete: append through the
                                    // closing brace and hand the entry off
                                    held.push_str(&rest[..cut]);
                                    let text = cx.selection_dynamic(buffer, &held);
                                    buffer.append(labels, &text, "");
                                    out.push(Emission::from(&*buffer));
                                    buffer.reset();
                                    rest = &rest[cut..];
                                    cursor.state = DocState::Regular;
                                    continue 'line;
                                }
                            }
                        }
                        _ => unreachable!("find matched one of \\ \" {{ }}"),
                    }
                    held.push_str(&rest[..cut]);
                    rest = &rest[cut..];
                    if rest.is_empty() {
                        break;
                    }
                }
                if !held.is_empty() {
                    let text = cx.selection_dynamic(buffer, &held);
                    buffer.append(labels, &text, "");
                }
            }
        }
    }

    // a line that leaves a document open contributes a line break, rendered
    // through the configured separator
    if !buffer.text.is_empty() {
        buffer.append(labels, "", cx.separator);
    }
}
