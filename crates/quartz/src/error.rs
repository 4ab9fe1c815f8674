//! Error types for Quartz operations.
//!
//! This module provides the main error type [`QuartzError`] which wraps
//! the conditions that can stop a document operation.

use std::io;

use thiserror::Error;

use quartz_parser::error::{Diagnostic, DiagnosticError};

/// The main error type for Quartz operations.
///
/// # Diagnostic Variants
///
/// The `Parse` and `Transform` variants carry the document text alongside
/// the diagnostics so labels can be rendered against their source lines.
#[derive(Debug, Error)]
pub enum QuartzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: DiagnosticError, src: String },

    #[error("{err}")]
    Transform { err: DiagnosticError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl QuartzError {
    /// Create a new `Parse` error with the associated document text.
    pub fn new_parse_error(err: impl Into<DiagnosticError>, src: impl Into<String>) -> Self {
        Self::Parse {
            err: err.into(),
            src: src.into(),
        }
    }

    /// Create a new `Transform` error from a rejected operation.
    pub fn new_transform_error(err: Diagnostic, src: impl Into<String>) -> Self {
        Self::Transform {
            err: err.into(),
            src: src.into(),
        }
    }
}
