//! Error and diagnostic system for the Quartz indexer and transformers.
//!
//! This module provides an error handling system with:
//! - Error codes grouped by phase (scanning, indexing, lookup,
//!   transformation, provenance)
//! - Labeled byte spans into the document text
//! - Severity levels, so recoverable problems travel as warnings
//! - A collector for accumulating diagnostics over a whole pass
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning with an optional error code, source locations,
//! and help text. Multiple diagnostics are wrapped in [`DiagnosticError`]
//! when a whole operation has to be rejected.
//!
//! # Example
//!
//! ```
//! # use quartz_parser::error::{Diagnostic, ErrorCode};
//! # use quartz_parser::Span;
//!
//! let header = Span::new(120..176);
//!
//! let diag = Diagnostic::warning("block `Characters/Ahri/Q` is never closed")
//!     .with_code(ErrorCode::E001)
//!     .with_label(header, "opened here")
//!     .with_help("check the converter output for a truncated file");
//! ```

mod collector;
mod diagnostic;
mod diagnostic_error;
mod error_code;

pub use collector::DiagnosticCollector;
pub use diagnostic::{Diagnostic, Label, Severity};
pub use diagnostic_error::{DiagnosticError, Result};
pub use error_code::ErrorCode;
