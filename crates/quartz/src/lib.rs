//! Quartz - A structural and color transformation engine for VFX text
//! documents.
//!
//! A [`Document`] pairs the line store of a particle-definition text with
//! its index. Structural edits ([`transform`]) splice new blocks into the
//! text and re-index, producing a fresh document. Color and blend-mode
//! edits ([`recolor`]) rewrite values in place through the coordinates the
//! index recorded.

pub mod config;
pub mod recolor;
pub mod transform;

mod error;

pub use quartz_core::{color, field, lines};
pub use quartz_parser::{Diagnostic, DiagnosticError, ErrorCode, IndexConfig, ParsedDocument};

pub use error::QuartzError;

use log::{debug, info, trace};

use quartz_core::lines::LineStore;
use quartz_parser::index_document;

/// A particle-definition text and its index.
///
/// The line store is the single source of truth; the index only holds
/// coordinates into it.
///
/// # Examples
///
/// ```rust
/// use quartz::{Document, IndexConfig};
///
/// let text = r#""a/b" = VfxSystemDefinitionData {
///     complexEmitterDefinitionData: list[pointer] = {
///         VfxEmitterDefinitionData {
///             emitterName: string = "Spark"
///         }
///     }
/// }"#;
///
/// let doc = Document::parse(text, IndexConfig::default());
/// assert_eq!(doc.index().system_count(), 1);
/// assert_eq!(doc.to_text(), text);
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    lines: LineStore,
    index: ParsedDocument,
    config: IndexConfig,
}

impl Document {
    /// Index `text`.
    ///
    /// Malformed blocks never fail the parse; they are skipped and reported
    /// through [`Document::diagnostics`].
    pub fn parse(text: &str, config: IndexConfig) -> Self {
        info!(bytes = text.len(); "Parsing document");
        Self::from_store(LineStore::from_text(text), config)
    }

    /// Index `text`, rejecting it if indexing produced any diagnostic.
    ///
    /// # Errors
    ///
    /// Returns [`QuartzError::Parse`] carrying every indexing diagnostic.
    pub fn parse_strict(text: &str, config: IndexConfig) -> Result<Self, QuartzError> {
        let doc = Self::parse(text, config);
        if doc.diagnostics().is_empty() {
            Ok(doc)
        } else {
            Err(QuartzError::new_parse_error(
                doc.diagnostics().to_vec(),
                text,
            ))
        }
    }

    /// Index an existing line store.
    pub fn from_store(lines: LineStore, config: IndexConfig) -> Self {
        let index = index_document(&lines, &config);
        debug!(
            lines = lines.len(),
            systems = index.system_count(),
            emitters = index.emitter_count();
            "Document ready"
        );
        trace!(index:?; "Document index");
        Self {
            lines,
            index,
            config,
        }
    }

    /// Serialize the document back to text.
    pub fn to_text(&self) -> String {
        self.lines.to_text()
    }

    pub fn lines(&self) -> &LineStore {
        &self.lines
    }

    pub fn index(&self) -> &ParsedDocument {
        &self.index
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Warnings produced while indexing.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.index.diagnostics()
    }

    /// A new document over `lines`, indexed with this document's
    /// configuration.
    pub fn reindexed(&self, lines: LineStore) -> Self {
        Self::from_store(lines, self.config.clone())
    }

    /// Borrow the line store and index together for in-place edits.
    pub(crate) fn parts_mut(&mut self) -> (&mut LineStore, &mut ParsedDocument) {
        (&mut self.lines, &mut self.index)
    }

    /// Replace the line store and index after a successful in-place edit.
    pub(crate) fn commit(&mut self, lines: LineStore, index: ParsedDocument) {
        self.lines = lines;
        self.index = index;
    }
}
