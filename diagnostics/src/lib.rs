//! Diagnostics for hierarchy checking
//!
//! A [`Diagnostic`] carries a severity, an optional stable code, a primary
//! location, labelled secondary locations, help lines and notes. Inputs that
//! carry no positions (serialized descriptions) produce diagnostics without a
//! span; the formatter then prints only the header and the trailing text.

use std::fmt;

pub use source_map::{FileId, SourceFile, SourceMap, SourcePosition, SourceSpan};

pub mod error_codes;
pub mod hierarchy;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Primary,
    Secondary,
}

/// A message attached to a span
#[derive(Debug, Clone)]
pub struct Label {
    pub span: SourceSpan,
    pub message: String,
    pub style: LabelStyle,
}

impl Label {
    pub fn primary(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    pub fn secondary(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: Option<String>,
    pub message: String,
    pub span: Option<SourceSpan>,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Vec<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().find(|l| l.style == LabelStyle::Primary)
    }
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// Diagnostics carrying the given code, e.g. `"E2002"`
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics
            .iter()
            .filter(move |d| d.code.as_deref() == Some(code))
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

/// Builder for creating diagnostics
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    fn with_severity(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic {
                severity,
                code: None,
                message: message.into(),
                span: None,
                labels: vec![],
                notes: vec![],
                help: vec![],
            },
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Warning, message)
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.diagnostic.code = Some(code.into());
        self
    }

    /// Primary location; also labels it when `message` is not empty
    pub fn at(mut self, span: Option<SourceSpan>, message: impl Into<String>) -> Self {
        let message = message.into();
        if let Some(span) = span {
            if !message.is_empty() {
                self.diagnostic
                    .labels
                    .push(Label::primary(span.clone(), message));
            }
            self.diagnostic.span = Some(span);
        }
        self
    }

    pub fn secondary_label(mut self, span: Option<SourceSpan>, message: impl Into<String>) -> Self {
        if let Some(span) = span {
            self.diagnostic.labels.push(Label::secondary(span, message));
        }
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.diagnostic.notes.push(note.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic.help.push(help.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        self.diagnostic
    }
}

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[32m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Renders diagnostics as rustc-style text
pub struct ErrorFormatter {
    use_colors: bool,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self { use_colors: false }
    }

    pub fn with_colors() -> Self {
        Self { use_colors: true }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    pub fn format_diagnostics(&self, diagnostics: &Diagnostics, source_map: &SourceMap) -> String {
        diagnostics
            .iter()
            .map(|d| self.format_diagnostic(d, source_map))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic, source_map: &SourceMap) -> String {
        let mut output = String::new();

        let severity_color = match diagnostic.severity {
            DiagnosticSeverity::Error => RED,
            DiagnosticSeverity::Warning => YELLOW,
        };
        let mut header = diagnostic.severity.to_string();
        if let Some(code) = &diagnostic.code {
            header.push_str(&format!("[{}]", code));
        }
        output.push_str(&self.paint(severity_color, &header));
        output.push_str(": ");
        output.push_str(&self.paint(BOLD, &diagnostic.message));
        output.push('\n');

        if let Some(span) = &diagnostic.span {
            let primary = diagnostic.primary_label().map(|l| l.message.as_str());
            self.format_snippet(&mut output, span, primary, source_map);
        }

        for label in diagnostic
            .labels
            .iter()
            .filter(|l| l.style == LabelStyle::Secondary)
        {
            if let Some(file) = source_map.get_file(label.span.file_id) {
                output.push_str(&format!(
                    "  {} {}:{}:{}: {}\n",
                    self.paint(CYAN, "-->"),
                    file.name,
                    label.span.start.line,
                    label.span.start.column,
                    label.message
                ));
            }
        }

        for help in &diagnostic.help {
            output.push_str(&format!("   = {}: {}\n", self.paint(GREEN, "help"), help));
        }
        for note in &diagnostic.notes {
            output.push_str(&format!("   = {}: {}\n", self.paint(BLUE, "note"), note));
        }

        output
    }

    fn format_snippet(
        &self,
        output: &mut String,
        span: &SourceSpan,
        label: Option<&str>,
        source_map: &SourceMap,
    ) {
        let Some(file) = source_map.get_file(span.file_id) else {
            return;
        };

        output.push_str(&format!(
            "  {} {}:{}:{}\n",
            self.paint(CYAN, "-->"),
            file.name,
            span.start.line,
            span.start.column
        ));

        let Some(line) = file.get_line(span.start.line) else {
            return;
        };
        let gutter = " ".repeat(span.start.line.to_string().len());
        let bar = self.paint(CYAN, "|");

        output.push_str(&format!("{} {}\n", gutter, bar));
        output.push_str(&format!(
            "{} {} {}\n",
            self.paint(CYAN, &span.start.line.to_string()),
            bar,
            line
        ));

        // Multi-line spans are underlined to the end of their first line
        let start_col = span.start.column.saturating_sub(1).min(line.len());
        let width = if span.start.line == span.end.line {
            span.end.column.saturating_sub(span.start.column)
        } else {
            line.len() - start_col
        };
        let carets = self.paint(RED, &"^".repeat(width.max(1)));

        output.push_str(&format!("{} {} {}{}", gutter, bar, " ".repeat(start_col), carets));
        if let Some(label) = label {
            output.push(' ');
            output.push_str(&self.paint(RED, label));
        }
        output.push('\n');
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_in(source_map: &SourceMap, file_id: FileId, start: usize, end: usize) -> SourceSpan {
        source_map.span_from_offsets(file_id, start, end).unwrap()
    }

    #[test]
    fn test_builder_collects_parts() {
        let mut source_map = SourceMap::new();
        let file_id = source_map.add_file("a.hpp", "class A final {};");
        let span = span_in(&source_map, file_id, 6, 7);

        let diagnostic = DiagnosticBuilder::error("class is final")
            .code("E2003")
            .at(Some(span.clone()), "declared final here")
            .secondary_label(Some(span), "also here")
            .help("remove 'final'")
            .with_note("final classes cannot be derived from")
            .build();

        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.code.as_deref(), Some("E2003"));
        assert_eq!(diagnostic.labels.len(), 2);
        assert_eq!(
            diagnostic.primary_label().map(|l| l.message.as_str()),
            Some("declared final here")
        );
        assert_eq!(diagnostic.help.len(), 1);
        assert_eq!(diagnostic.notes.len(), 1);
    }

    #[test]
    fn test_builder_without_span() {
        let diagnostic = DiagnosticBuilder::warning("no location")
            .at(None, "ignored")
            .secondary_label(None, "ignored too")
            .build();

        assert!(diagnostic.span.is_none());
        assert!(diagnostic.labels.is_empty());
        assert!(!diagnostic.is_error());
    }

    #[test]
    fn test_plain_rendering_with_snippet() {
        let mut source_map = SourceMap::new();
        let file_id = source_map.add_file("a.hpp", "class B : A {};\n");
        let span = span_in(&source_map, file_id, 10, 11);

        let diagnostic = DiagnosticBuilder::error("cannot derive from final class 'A'")
            .code("E2003")
            .at(Some(span), "'A' is final")
            .help("remove 'final' from 'A'")
            .build();

        let rendered = ErrorFormatter::new().format_diagnostic(&diagnostic, &source_map);
        let expected = "\
error[E2003]: cannot derive from final class 'A'
  --> a.hpp:1:11
  |
1 | class B : A {};
  |           ^ 'A' is final
   = help: remove 'final' from 'A'
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_rendering_without_span() {
        let diagnostic = DiagnosticBuilder::error("duplicate class 'A'")
            .code("E1001")
            .with_note("first declared earlier in the description")
            .build();

        let rendered = ErrorFormatter::new().format_diagnostic(&diagnostic, &SourceMap::new());
        assert_eq!(
            rendered,
            "error[E1001]: duplicate class 'A'\n   = note: first declared earlier in the description\n"
        );
    }

    #[test]
    fn test_collection_filters() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticBuilder::error("e").code("E2001").build());
        diagnostics.push(DiagnosticBuilder::warning("w").code("E1201").build());
        diagnostics.extend(DiagnosticBuilder::error("e2").code("E2001").build().into());

        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.errors().count(), 2);
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(diagnostics.with_code("E2001").count(), 2);
    }
}
