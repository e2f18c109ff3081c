use std::collections::BTreeMap;

use super::*;
use crate::span::Span;

#[test]
fn report_is_not_fatal() {
    let mut reporter = Reporter::new();
    reporter.report(Diagnostic::warning("a.hs", Span::new(0, 1), "unused"));
    assert!(!reporter.has_fatal());
    assert_eq!(reporter.diagnostics().len(), 1);
}

#[test]
fn report_fatal_sets_flag() {
    let mut reporter = Reporter::new();
    let fatal = reporter.report_fatal(Diagnostic::error("a.hs", Span::new(0, 1), "boom"));
    assert_eq!(fatal, Fatal);
    assert!(reporter.has_fatal());
    assert_eq!(reporter.error_count(), 1);
}

#[test]
fn render_plain_format_has_location() {
    let mut reporter = Reporter::new();
    reporter.report(Diagnostic::error(
        "a.hs",
        Span::new(4, 5),
        "unknown identifier 'y'",
    ));
    let mut sources = BTreeMap::new();
    sources.insert("a.hs".to_string(), "f = y\n".to_string());

    let output = reporter.render(&sources, false);
    assert!(output.starts_with("a.hs:1:5: error: unknown identifier 'y'"));
}

#[test]
fn render_includes_snippet_and_caret() {
    let mut reporter = Reporter::new();
    reporter.report(Diagnostic::error("a.hs", Span::new(10, 12), "bad"));
    let mut sources = BTreeMap::new();
    sources.insert("a.hs".to_string(), "f x = x\ng = zz\n".to_string());

    let output = reporter.render(&sources, false);
    assert!(output.contains("   2 | g = zz"), "missing snippet: {output}");
    assert!(output.contains("^^"), "missing caret: {output}");
}

#[test]
fn render_sorts_by_position() {
    let mut reporter = Reporter::new();
    reporter.report(Diagnostic::error("a.hs", Span::new(8, 9), "second"));
    reporter.report(Diagnostic::error("a.hs", Span::new(0, 1), "first"));
    let sources = BTreeMap::new();

    let output = reporter.render(&sources, false);
    let first = output.find("first").unwrap();
    let second = output.find("second").unwrap();
    assert!(first < second);
}

#[test]
fn render_without_source_omits_location() {
    let mut reporter = Reporter::new();
    reporter.report(Diagnostic::error("a.hs", Span::new(0, 1), "boom"));
    let output = reporter.render(&BTreeMap::new(), false);
    assert!(output.starts_with("a.hs: error: boom"));
}
