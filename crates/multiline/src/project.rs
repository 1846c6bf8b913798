//! Capture-group projection
//!
//! Splits a line into the text covered by a regex's capture groups and the
//! text left over. Modes use the covered part as a group key or as the
//! payload to keep, and the residue as the payload with the key elided.

use regex::Regex;

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;

/// Split `s` by the capture groups of `expression`
///
/// Returns `(selected, residual)`:
///
/// - `selected` is the concatenation of the text covered by each capture
///   group, in group order across all non-overlapping matches.
/// - `residual` is the concatenation of the text covered by no emitted
///   capture, in input order.
///
/// A capture is skipped when it did not participate in its match, when it is
/// empty, or when it starts before the end of the previously accepted capture
/// (nested or overlapping groups). Interleaving `selected` and `residual`
/// back in position order reconstructs `s` exactly.
///
/// Without capture groups `selected` is empty and `residual` equals `s`.
pub fn disjoint(expression: &Regex, s: &str) -> (String, String) {
    let mut selected = String::new();
    let mut residual = String::new();
    let mut last = 0;

    for caps in expression.captures_iter(s) {
        for i in 1..caps.len() {
            let Some(m) = caps.get(i) else { continue };
            let (beg, end) = (m.start(), m.end());
            if end > beg && beg >= last {
                residual.push_str(&s[last..beg]);
                selected.push_str(&s[beg..end]);
                last = end;
            }
        }
    }

    if last < s.len() {
        residual.push_str(&s[last..]);
    }

    (selected, residual)
}

/// The `selected` part of [`disjoint`], or `s` unchanged when no expression
/// is configured
pub fn selection(expression: Option<&Regex>, s: &str) -> String {
    match expression {
        Some(re) => disjoint(re, s).0,
        None => s.to_string(),
    }
}
