//! Collector for accumulating diagnostics during a pass.
//!
//! The [`DiagnosticCollector`] lets the indexer and the batch transformers
//! keep going after a recoverable problem and report everything at the end.

use crate::error::{Diagnostic, DiagnosticError, Severity};

/// A collector for accumulating diagnostics.
///
/// # Example
///
/// ```
/// # use quartz_parser::error::{Diagnostic, DiagnosticCollector, ErrorCode};
///
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::warning("block `a/b` is never closed").with_code(ErrorCode::E001),
/// );
///
/// // Warnings alone do not fail the pass.
/// let warnings = collector.finish().unwrap();
/// assert_eq!(warnings.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity() == Severity::Error {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns `true` if at least one error was emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection.
    ///
    /// - If there are errors, returns `Err(DiagnosticError)` with all diagnostics.
    /// - Otherwise returns the warnings that were emitted.
    pub fn finish(self) -> Result<Vec<Diagnostic>, DiagnosticError> {
        if self.has_errors {
            Err(DiagnosticError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }

    /// Take every collected diagnostic regardless of severity.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert!(collector.is_empty());
        assert!(collector.finish().unwrap().is_empty());
    }

    #[test]
    fn test_collector_emit_error_finish_err() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("warning 1"));
        collector.emit(
            Diagnostic::error("unknown system")
                .with_code(ErrorCode::E200)
                .with_label(Span::new(10..20), "here"),
        );

        assert!(collector.has_errors());
        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[1].message(), "unknown system");
    }

    #[test]
    fn test_collector_warnings_are_returned() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("warning 1"));
        collector.emit(Diagnostic::warning("warning 2"));

        let warnings = collector.finish().unwrap();
        assert_eq!(warnings.len(), 2);
    }
}
