//! Shared diagnostic record used by both the semantic validator (§4.5) and
//! the ReDoS analyzer (§4.6), plus its rendering.
//!
//! Grounds on `plotnik-lib::diagnostics::{mod.rs,printer.rs}`: a plain
//! `Diagnostic` record carrying a severity, a stable code, a byte span and a
//! message, collected into a flat list and rendered either as bare caret
//! snippets or, behind the `pretty` feature, full `annotate-snippets`
//! reports — the same two-tier rendering `DiagnosticsPrinter` offers there.
//! This is an ambient concern (human-readable error reporting) carried
//! forward even though §1 places CLI-facing formatters out of scope; see
//! `SPEC_FULL.md`.

use crate::error::{caret_snippet, ErrorCode};
use crate::span::ByteSpan;

/// Severity of a single finding. The validator only ever reports `Warning`
/// and `Error`; the ReDoS analyzer's severity buckets (§4.6) additionally
/// use `Info` (safe) and `Critical` (catastrophic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// One validator or ReDoS finding.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub span: ByteSpan,
    pub message: String,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: ErrorCode,
        span: ByteSpan,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            span,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Caret-snippet rendering, available regardless of the `pretty`
    /// feature (§7's plain snippet string every error already carries).
    pub fn snippet(&self, source: &str) -> String {
        caret_snippet(source, self.span.start)
    }
}

/// Renders a set of diagnostics against their originating source.
///
/// Grounded on `plotnik-lib::diagnostics::printer::DiagnosticsPrinter`'s
/// builder shape (`new`/`source`/chained setters/`render`); the `pretty`
/// feature swaps the plain-text renderer for a full `annotate-snippets`
/// report using the same `Level`/`Group`/`Snippet` API plotnik's printer
/// uses.
pub struct DiagnosticsPrinter<'a> {
    source: &'a str,
    origin: Option<&'a str>,
    colored: bool,
}

impl<'a> DiagnosticsPrinter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            origin: None,
            colored: false,
        }
    }

    pub fn origin(mut self, origin: &'a str) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        #[cfg(feature = "pretty")]
        {
            self.render_pretty(diagnostics)
        }
        #[cfg(not(feature = "pretty"))]
        {
            self.render_plain(diagnostics)
        }
    }

    fn render_plain(&self, diagnostics: &[Diagnostic]) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        for (i, d) in diagnostics.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "{:?} [{}]: {}", d.severity, d.code, d.message);
            out.push_str(&d.snippet(self.source));
            if let Some(hint) = &d.hint {
                let _ = write!(out, "\nhint: {hint}");
            }
            out.push('\n');
        }
        out
    }

    #[cfg(feature = "pretty")]
    fn render_pretty(&self, diagnostics: &[Diagnostic]) -> String {
        use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
        use std::fmt::Write;

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        let origin = self.origin.unwrap_or("<pattern>");

        let mut out = String::new();
        for (i, d) in diagnostics.iter().enumerate() {
            let range = adjust_range(d.span, self.source.len());
            let mut snippet = Snippet::source(self.source)
                .path(origin)
                .annotation(AnnotationKind::Primary.span(range).label(&d.message));
            if self.origin.is_none() {
                snippet = snippet.path(origin);
            }

            let level = severity_to_level(d.severity);
            let title_group = level.primary_title(&d.message).element(snippet);
            let report = vec![title_group];

            if i > 0 {
                out.push('\n');
            }
            let _ = write!(out, "{}", renderer.render(&report));
        }
        out
    }
}

#[cfg(feature = "pretty")]
fn severity_to_level(severity: Severity) -> annotate_snippets::Level<'static> {
    use annotate_snippets::Level;
    match severity {
        Severity::Info => Level::NOTE,
        Severity::Warning => Level::WARNING,
        Severity::Error | Severity::Critical => Level::ERROR,
    }
}

#[cfg(feature = "pretty")]
fn adjust_range(span: ByteSpan, limit: usize) -> std::ops::Range<usize> {
    let start = (span.start as usize).min(limit);
    let end = (span.end as usize).min(limit);
    if start == end {
        start..(start + 1).min(limit)
    } else {
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_render_includes_message_and_snippet() {
        let source = "(a+)+b";
        let diag = Diagnostic::new(
            Severity::Critical,
            ErrorCode("regex.redos.nested-quantifier"),
            ByteSpan::new(0, 4),
            "catastrophic backtracking",
        );
        let printer = DiagnosticsPrinter::new(source);
        let rendered = printer.render_plain(&[diag]);
        assert!(rendered.contains("catastrophic backtracking"));
        assert!(rendered.contains(source));
    }

    #[test]
    fn hint_is_appended_when_present() {
        let source = "(a)(a)";
        let diag = Diagnostic::new(
            Severity::Warning,
            ErrorCode("regex.semantic.duplicate-group-name"),
            ByteSpan::new(0, 3),
            "duplicate group name",
        )
        .with_hint("did you mean `b`?");
        let printer = DiagnosticsPrinter::new(source);
        let rendered = printer.render_plain(&[diag]);
        assert!(rendered.contains("did you mean"));
    }
}
