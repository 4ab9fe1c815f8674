//! The core diagnostic type for the Quartz error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, labeled spans into the document text, and help text.

use std::fmt;

use crate::{error::error_code::ErrorCode, span::Span};

/// Whether a diagnostic rejected its operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The operation was rejected and the document left untouched.
    Error,
    /// Reported while the operation still completes.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// A message attached to a byte span of the document text. The first label
/// of a diagnostic marks its main location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
}

impl Label {
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A diagnostic message with source location information.
///
/// Diagnostics carry:
/// - A severity level
/// - An optional error code
/// - A primary message describing the issue
/// - Zero or more labeled byte spans in the document text
/// - Optional help text
///
/// # Example
///
/// ```text
/// warning[E001]: block `Characters/Ahri/Skins/Skin0/Particles/Q` is never closed
///    |
/// 42 |     "Characters/Ahri/Skins/Skin0/Particles/Q" = VfxSystemDefinitionData {
///    |     ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ opened here
///    |
///    = help: the block was skipped; other systems are unaffected
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use quartz_parser::error::{Diagnostic, ErrorCode};
    /// # use quartz_parser::Span;
    ///
    /// let diag = Diagnostic::error("unknown system `a/b`")
    ///     .with_code(ErrorCode::E200)
    ///     .with_label(Span::new(0..10), "not found")
    ///     .with_help("list the document to see available systems");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a label. The first one added marks the main location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            message: message.into(),
        });
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Downgrade to a warning, keeping code, labels and help.
    pub fn into_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
