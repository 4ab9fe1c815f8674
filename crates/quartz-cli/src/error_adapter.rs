//! Error adapter for converting QuartzError to miette diagnostics.
//!
//! This module provides the bridge between the library's error types and
//! miette's rich diagnostic formatting used in the CLI. A
//! [`QuartzError::Parse`] or [`QuartzError::Transform`] carrying several
//! diagnostics renders each one independently.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity as MietteSeverity, SourceSpan};

use quartz::QuartzError;
use quartz_parser::{
    Span,
    error::{Diagnostic, Severity},
};

/// Adapter for a single quartz diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Document text the labels point into
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().enumerate().map(|(position, label)| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if position == 0 {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`QuartzError`] variants without diagnostics.
pub struct ErrorAdapter<'a>(pub &'a QuartzError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            QuartzError::Io(_) => "quartz::io",
            QuartzError::Config(_) => "quartz::config",
            QuartzError::Parse { .. } | QuartzError::Transform { .. } => return None,
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A plain error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`QuartzError`] into a list of reportable errors, one per
/// diagnostic for `Parse` and `Transform`.
pub fn to_reportables(err: &QuartzError) -> Vec<Reportable<'_>> {
    match err {
        QuartzError::Parse { err, src } | QuartzError::Transform { err, src } => err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

/// Render one diagnostic against `src` as a miette report.
pub fn render(diag: &Diagnostic, src: &str) -> String {
    let mut writer = String::new();
    let reportable = Reportable::Diagnostic(DiagnosticAdapter::new(diag, src));
    if miette::GraphicalReportHandler::new()
        .render_report(&mut writer, &reportable)
        .is_err()
    {
        return diag.to_string();
    }
    writer
}

#[cfg(test)]
mod tests {
    use quartz_parser::error::{DiagnosticError, ErrorCode};

    use super::*;

    #[test]
    fn test_each_diagnostic_is_reported() {
        let diags = vec![
            Diagnostic::error("unbalanced braces")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(0..5), "opened here"),
            Diagnostic::warning("unclosed emitter").with_help("add the missing `}`"),
        ];
        let err = QuartzError::new_parse_error(DiagnosticError::new(diags), "hello world");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "unbalanced braces");
        assert_eq!(reportables[1].severity(), Some(MietteSeverity::Warning));
        assert_eq!(reportables[1].help().unwrap().to_string(), "add the missing `}`");
    }

    #[test]
    fn test_transform_error_has_code() {
        let diag = Diagnostic::error("unknown system `a/b`").with_code(ErrorCode::E200);
        let err = QuartzError::new_transform_error(diag, "");
        let reportables = to_reportables(&err);
        assert_eq!(reportables[0].code().unwrap().to_string(), "E200");
    }

    #[test]
    fn test_non_diagnostic_error() {
        let err = QuartzError::Config("bad indent".to_string());
        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert_eq!(reportables[0].to_string(), "Configuration error: bad indent");
        assert_eq!(reportables[0].code().unwrap().to_string(), "quartz::config");
    }

    #[test]
    fn test_first_label_is_primary() {
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::new(0..5), "main")
            .with_label(Span::new(10..15), "context");
        let adapter = DiagnosticAdapter::new(&diag, "some source code");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
    }
}
