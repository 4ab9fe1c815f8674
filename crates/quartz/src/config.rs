//! Configuration types for Quartz document operations.
//!
//! This module provides configuration structures that control how documents
//! are indexed, how variants are generated and which palettes are
//! available for recoloring. All types implement [`serde::Deserialize`] for
//! flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining every section.
//! - [`IndexSection`] - Asset root and block scanning mode used by the indexer.
//! - [`VariantsConfig`] - Indentation and backup folder used for generated variants.
//! - [`RecolorConfig`] - Black/white re-roll default and named palettes.
//!
//! # Example
//!
//! ```
//! # use quartz::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.index().asset_root(), "ASSETS");
//! assert_eq!(config.variants().backup_folder(), "_backup");
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use quartz_core::lines::ScanMode;
use quartz_parser::IndexConfig;

use crate::recolor::Palette;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Indexer configuration section.
    #[serde(default)]
    index: IndexSection,

    /// Variant generation section.
    #[serde(default)]
    variants: VariantsConfig,

    /// Recolor section.
    #[serde(default)]
    recolor: RecolorConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(index: IndexSection, variants: VariantsConfig, recolor: RecolorConfig) -> Self {
        Self {
            index,
            variants,
            recolor,
        }
    }

    /// Returns the indexer configuration.
    pub fn index(&self) -> &IndexSection {
        &self.index
    }

    /// Returns the variant generation configuration.
    pub fn variants(&self) -> &VariantsConfig {
        &self.variants
    }

    /// Returns the recolor configuration.
    pub fn recolor(&self) -> &RecolorConfig {
        &self.recolor
    }

    /// The [`IndexConfig`] documents are parsed with.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::new(self.index.asset_root.clone(), self.index.scan_mode)
    }
}

/// Indexer settings as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexSection {
    /// Top-level folder every resource path starts with.
    #[serde(default = "default_asset_root")]
    asset_root: String,

    /// How braces are counted when scanning blocks.
    #[serde(default)]
    scan_mode: ScanMode,
}

impl IndexSection {
    pub fn new(asset_root: impl Into<String>, scan_mode: ScanMode) -> Self {
        Self {
            asset_root: asset_root.into(),
            scan_mode,
        }
    }

    pub fn asset_root(&self) -> &str {
        &self.asset_root
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }
}

impl Default for IndexSection {
    fn default() -> Self {
        Self::new(default_asset_root(), ScanMode::default())
    }
}

/// Settings for generated systems and randomizers.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantsConfig {
    /// Spaces per nesting level in generated blocks.
    #[serde(default = "default_indent")]
    indent: usize,

    /// Provenance folder that mirrors every isolated asset.
    #[serde(default = "default_backup_folder")]
    backup_folder: String,
}

impl VariantsConfig {
    pub fn new(indent: usize, backup_folder: impl Into<String>) -> Self {
        Self {
            indent,
            backup_folder: backup_folder.into(),
        }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// One level of indentation as a string.
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent)
    }

    pub fn backup_folder(&self) -> &str {
        &self.backup_folder
    }
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self::new(default_indent(), default_backup_folder())
    }
}

/// Recolor defaults and named palettes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecolorConfig {
    /// Re-roll random picks that land on pure black or white.
    #[serde(default)]
    ignore_black_white: bool,

    /// Palettes by name, each a list of CSS colors with optional `@time`.
    #[serde(default)]
    palettes: BTreeMap<String, Vec<String>>,
}

impl RecolorConfig {
    pub fn ignore_black_white(&self) -> bool {
        self.ignore_black_white
    }

    /// Names of the configured palettes, sorted.
    pub fn palette_names(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }

    /// Returns the parsed palette called `name`, or `None` if no palette
    /// has that name.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured stop cannot be parsed.
    pub fn palette(&self, name: &str) -> Result<Option<Palette>, String> {
        self.palettes
            .get(name)
            .map(|stops| Palette::parse(stops))
            .transpose()
            .map_err(|err| format!("Invalid palette `{name}` in config: {err}"))
    }
}

fn default_asset_root() -> String {
    "ASSETS".to_string()
}

fn default_indent() -> usize {
    4
}

fn default_backup_folder() -> String {
    "_backup".to_string()
}
