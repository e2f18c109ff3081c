//! Reporter - diagnostic accumulation with fatal short-circuiting.
//!
//! Passes report diagnostics into a `Reporter` and propagate `Fatal` with
//! `?` when a diagnostic stops the current module. The driver checks
//! `has_fatal` at the end and renders everything in source order.

use std::collections::BTreeMap;

use colored::Colorize;

use crate::diagnostics::{Diagnostic, Severity};
use crate::position::LineMap;

/// Marker error: a fatal diagnostic was reported.
///
/// The diagnostic itself lives in the `Reporter`; `Fatal` only unwinds the
/// current computation. It carries no payload on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fatal;

impl std::fmt::Display for Fatal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fatal diagnostic reported")
    }
}

impl std::error::Error for Fatal {}

/// Result alias used by every compiler pass.
pub type Result<T> = std::result::Result<T, Fatal>;

/// Accumulates diagnostics for the whole compilation.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    fatal: bool,
}

impl Reporter {
    #[must_use]
    pub fn new() -> Self {
        Reporter::default()
    }

    /// Record a non-fatal diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record a diagnostic and signal a fatal stop for the current module.
    pub fn report_fatal(&mut self, diagnostic: Diagnostic) -> Fatal {
        self.diagnostics.push(diagnostic);
        self.fatal = true;
        Fatal
    }

    /// Whether any fatal diagnostic has been reported.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.fatal
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Render all diagnostics, sorted by file and source position.
    ///
    /// `sources` maps file paths to their text; files present in the map get
    /// a source snippet with a caret line under the offending span. `pretty`
    /// adds color; the plain format is `file:line:col: severity: message`.
    #[must_use]
    pub fn render(&self, sources: &BTreeMap<String, String>, pretty: bool) -> String {
        let mut sorted: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        sorted.sort_by(|a, b| (&a.file, a.span.start).cmp(&(&b.file, b.span.start)));

        let mut out = String::new();
        for diagnostic in sorted {
            render_one(&mut out, diagnostic, sources.get(&diagnostic.file), pretty);
        }
        out
    }
}

fn render_one(out: &mut String, diagnostic: &Diagnostic, source: Option<&String>, pretty: bool) {
    let (line, col, snippet) = match source {
        Some(text) if !diagnostic.span.is_dummy() => {
            let map = LineMap::build(text);
            let (line, col) = map.position(diagnostic.span.start);
            let snippet = code_frame(text, &map, diagnostic, line, col, pretty);
            (line + 1, col + 1, Some(snippet))
        }
        _ => (0, 0, None),
    };

    let severity = if pretty {
        match diagnostic.severity {
            Severity::Error => diagnostic.severity.to_string().red().bold().to_string(),
            Severity::Warning => diagnostic.severity.to_string().yellow().bold().to_string(),
            Severity::Info => diagnostic.severity.to_string().cyan().to_string(),
        }
    } else {
        diagnostic.severity.to_string()
    };

    if line == 0 {
        out.push_str(&format!(
            "{}: {}: {}\n",
            diagnostic.file, severity, diagnostic.message
        ));
    } else {
        out.push_str(&format!(
            "{}:{}:{}: {}: {}\n",
            diagnostic.file, line, col, severity, diagnostic.message
        ));
    }
    if let Some(snippet) = snippet {
        out.push_str(&snippet);
    }
    out.push('\n');
}

/// One source line with a caret marker under the diagnostic's span.
fn code_frame(
    text: &str,
    map: &LineMap,
    diagnostic: &Diagnostic,
    line: usize,
    col: usize,
    pretty: bool,
) -> String {
    let line_text = map.line_text(text, line);
    let gutter = format!("{:>4} | ", line + 1);

    // Caret width covers the span, clamped to the end of the line.
    let span_len = diagnostic.span.len().max(1) as usize;
    let width = span_len.min(line_text.len().saturating_sub(col).max(1));
    let marker = format!("{}{}", " ".repeat(col), "^".repeat(width));
    let marker = if pretty {
        match diagnostic.severity {
            Severity::Error => marker.red().bold().to_string(),
            Severity::Warning => marker.yellow().bold().to_string(),
            Severity::Info => marker.cyan().to_string(),
        }
    } else {
        marker
    };

    format!(
        "{gutter}{line_text}\n{empty:>width$}{marker}\n",
        empty = "| ",
        width = gutter.len(),
    )
}

#[cfg(test)]
#[path = "tests/reporter.rs"]
mod tests;
