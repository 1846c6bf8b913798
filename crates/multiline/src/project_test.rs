//! Tests for capture-group projection

use super::*;

fn run_disjoint(pattern: &str, s: &str) -> (String, String) {
    let re = Regex::new(pattern).unwrap();
    disjoint(&re, s)
}

#[test]
fn test_repeated_single_group() {
    let (sel, inv) = run_disjoint(r"F:(\S+\s*)", "F:1 F:2");
    assert_eq!(sel, "1 2");
    assert_eq!(inv, "F:F:");
}

#[test]
fn test_two_groups_one_match() {
    let (sel, inv) = run_disjoint(r"(F:\S+\s*).*(H:\S+\s*)", "E:1 F:1 G:1 H:1");
    assert_eq!(sel, "F:1 H:1");
    assert_eq!(inv, "E:1 G:1 ");
}

#[test]
fn test_alternated_repeated_groups() {
    let (sel, inv) = run_disjoint(
        r"(F:\S+\s*)+|(H:\S+\s*)+",
        "E:1 F:1 G:1 H:1 E:2 F:2 G:2 H:2",
    );
    assert_eq!(sel, "F:1 H:1 F:2 H:2");
    assert_eq!(inv, "E:1 G:1 E:2 G:2 ");
}

#[test]
fn test_nested_groups_outer_wins() {
    let (sel, inv) = run_disjoint(
        r"((F:\S+\s*).*(H:\S+\s*))*",
        "E:1 F:1 G:1 H:1 I:1 E:2 F:2 G:2 H:2 I:2",
    );
    assert_eq!(sel, "F:1 G:1 H:1 I:1 E:2 F:2 G:2 H:2 ");
    assert_eq!(inv, "E:1 I:2");
}

#[test]
fn test_continuation_mark() {
    let (sel, inv) = run_disjoint(r"(.*)\\$", r"this line continue\");
    assert_eq!(sel, "this line continue");
    assert_eq!(inv, r"\");
}

#[test]
fn test_no_capture_groups() {
    let (sel, inv) = run_disjoint(r"F:\S+", "F:1 F:2");
    assert_eq!(sel, "");
    assert_eq!(inv, "F:1 F:2");
}

#[test]
fn test_no_match_at_all() {
    let (sel, inv) = run_disjoint(r"(Z:\S+)", "F:1 F:2");
    assert_eq!(sel, "");
    assert_eq!(inv, "F:1 F:2");
}

#[test]
fn test_roundtrip_reconstruction() {
    // selected + residual together cover every input character exactly once
    let cases = [
        (r"F:(\S+\s*)", "F:1 F:2"),
        (r"(F:\S+\s*).*(H:\S+\s*)", "E:1 F:1 G:1 H:1"),
        (r"^(\S+)", "G:1 event"),
        (r"(\d+)", "abc 123 def 456"),
    ];
    for (pattern, s) in cases {
        let (sel, inv) = run_disjoint(pattern, s);
        assert_eq!(sel.len() + inv.len(), s.len(), "case {pattern} on {s}");
    }
}

#[test]
fn test_selection_without_expression_passes_through() {
    assert_eq!(selection(None, "anything at all"), "anything at all");
}

#[test]
fn test_selection_with_expression() {
    let re = Regex::new(r"^(\S+)").unwrap();
    assert_eq!(selection(Some(&re), "G:1 event"), "G:1");
}

#[test]
fn test_selection_empty_when_groups_absent() {
    let re = Regex::new(r"^\S+").unwrap();
    assert_eq!(selection(Some(&re), "G:1 event"), "");
}
