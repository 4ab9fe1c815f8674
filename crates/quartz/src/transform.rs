//! Structural transformation.
//!
//! Every operation here is a function of a [`Document`], a selection and
//! options. It plans line edits against the current text, applies them in
//! one step and re-indexes the result into a new [`Document`]; the input
//! document is never modified. Names allocated during a run are tracked in
//! an explicit [`UsedNames`] set threaded through the calls, so a batch
//! never hands out the same key twice.

mod edit;
mod isolate;
mod map;
mod names;
mod split;
mod template;
mod variants;

pub use isolate::{Provenance, ProvenanceEntry, isolate_assets};
pub use map::append_map_entries;
pub use names::{UsedNames, unique_base, unique_name};
pub use split::{SplitOutcome, split_emitters, split_short_name};
pub use template::{randomizer_lines, reindent, trigger_lines, wrapper_system_lines};
pub use variants::{randomize_emitter, randomize_emitters, randomize_system, randomize_systems};

use std::fmt;

use quartz_parser::error::{Diagnostic, ErrorCode};

use crate::Document;

/// Suffix appended to the name of a randomizer emitter.
pub use quartz_parser::document::RANDOMIZED_SUFFIX;

/// Which variants to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRequest {
    suffixes: Vec<String>,
    isolate_assets: bool,
}

impl VariantRequest {
    /// One variant per suffix, in order.
    pub fn new<S: Into<String>>(suffixes: impl IntoIterator<Item = S>) -> Self {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
            isolate_assets: false,
        }
    }

    /// Rewrite asset paths of each variant into a folder named after its
    /// suffix.
    pub fn with_asset_isolation(mut self, isolate: bool) -> Self {
        self.isolate_assets = isolate;
        self
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn isolates_assets(&self) -> bool {
        self.isolate_assets
    }

    /// Check that every suffix is usable in a key and none repeats.
    ///
    /// # Errors
    ///
    /// `E300` describing the first bad suffix.
    pub fn validate(&self) -> Result<(), Diagnostic> {
        if self.suffixes.is_empty() {
            return Err(Diagnostic::error("no variant suffixes given")
                .with_code(ErrorCode::E300)
                .with_help("request at least one variant, e.g. `fire`"));
        }
        if let Some(bad) = self.suffixes.iter().find(|suffix| {
            suffix.is_empty()
                || suffix
                    .chars()
                    .any(|ch| ch.is_whitespace() || matches!(ch, '"' | '{' | '}' | '/' | '\\'))
        }) {
            return Err(Diagnostic::error(format!("suffix `{bad}` cannot be used in a key"))
                .with_code(ErrorCode::E300)
                .with_help(
                    "suffixes may not be empty or contain spaces, quotes, braces or slashes",
                ));
        }
        let mut seen = UsedNames::new();
        for suffix in &self.suffixes {
            if seen.contains(suffix) {
                return Err(Diagnostic::error(format!("suffix `{suffix}` is repeated"))
                    .with_code(ErrorCode::E300));
            }
            seen.insert(suffix);
        }
        Ok(())
    }
}

/// Result of one randomization.
#[derive(Debug, Clone)]
pub struct VariantOutcome {
    /// The re-indexed document.
    pub document: Document,
    /// Asset paths rewritten for the new variants.
    pub provenance: Provenance,
    /// Keys of the generated systems, in suffix order.
    pub created: Vec<String>,
    /// Name of the randomizer emitter.
    pub randomizer: String,
}

/// Per-item result summary of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: Vec<(String, Diagnostic)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} succeeded, {} failed",
            self.succeeded,
            self.total(),
            self.failed.len()
        )
    }
}

/// Result of a batch of randomizations.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub document: Document,
    pub provenance: Provenance,
    pub created: Vec<String>,
    pub report: BatchReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(VariantRequest::new(["fire", "ice"]).validate().is_ok());

        let empty = VariantRequest::new(Vec::<String>::new());
        assert_eq!(empty.validate().unwrap_err().code(), Some(ErrorCode::E300));
        for bad in ["", "a b", "x\"y", "a/b"] {
            let err = VariantRequest::new([bad]).validate().unwrap_err();
            assert_eq!(err.code(), Some(ErrorCode::E300), "suffix {bad:?}");
        }
        assert!(VariantRequest::new(["fire", "FIRE"]).validate().is_err());
    }

    #[test]
    fn test_batch_report_display() {
        let mut report = BatchReport {
            succeeded: 2,
            ..Default::default()
        };
        report
            .failed
            .push(("a/b:Spark".to_string(), Diagnostic::error("unknown emitter")));
        assert_eq!(report.to_string(), "2 of 3 succeeded, 1 failed");
        assert!(!report.is_clean());
    }
}
