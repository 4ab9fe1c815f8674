//! # Quartz Parser
//!
//! Indexer for the textual VFX particle-definition format. This crate turns
//! a [`LineStore`](quartz_core::lines::LineStore) into a [`ParsedDocument`]:
//! ordered catalogs of particle systems, their emitters, static materials
//! and the resource map, each recorded by line coordinates only.
//!
//! ## Usage
//!
//! ```
//! # use quartz_core::lines::LineStore;
//! # use quartz_parser::{IndexConfig, index_document};
//!
//! let text = r#""Characters/Ahri/Q" = VfxSystemDefinitionData {
//!     complexEmitterDefinitionData: list[pointer] = {
//!         VfxEmitterDefinitionData {
//!             emitterName: string = "Spark"
//!             color: vec4 = { 1, 0.5, 0, 1 }
//!         }
//!     }
//! }"#;
//!
//! let store = LineStore::from_text(text);
//! let doc = index_document(&store, &IndexConfig::default());
//!
//! let spark = doc.find_emitter("Characters/Ahri/Q", "Spark").unwrap();
//! assert_eq!(spark.colors().len(), 1);
//! ```

pub mod document;
pub mod error;
pub mod index;
#[cfg(test)]
mod index_tests;
pub mod lexer;
pub mod scan;
mod span;

pub use document::{
    AssetRef, BlendMode, ColorParam, ColorProperty, ColorStop, ColorValue, Material,
    ParsedDocument, ResourceMap, VfxEmitter, VfxSystem,
};
pub use error::{Diagnostic, DiagnosticError, ErrorCode};
pub use index::{IndexConfig, index_document};
pub use scan::{BlockSpan, Position, Scan};
pub use span::Span;
