//! The parsed document: catalogs of systems, emitters and materials.
//!
//! Nothing in these types owns document text. Every value records the line
//! coordinates it was read from so transformers can write back in place and
//! structural edits can splice whole blocks by range.

use indexmap::{IndexMap, IndexSet};
use quartz_core::{
    color::Color,
    field::ColorField,
    lines::{LineRange, ValueCoord},
};

use crate::error::Diagnostic;

/// Display name used for emitters without an `emitterName`.
pub const UNNAMED_EMITTER: &str = "Unnamed";

/// Name suffix of randomizer emitters.
pub const RANDOMIZED_SUFFIX: &str = "_randomized";

/// One color literal and where it lives.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorValue {
    coord: ValueCoord,
    color: Color,
    width: usize,
}

impl ColorValue {
    pub fn new(coord: ValueCoord, color: Color, width: usize) -> Self {
        Self {
            coord,
            color,
            width,
        }
    }

    pub fn coord(&self) -> ValueCoord {
        self.coord
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Number of components in the literal (3 or 4).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Components to write back, truncated to the literal's width.
    pub fn literal(&self) -> Vec<f32> {
        self.color.to_literal(self.width)
    }

    /// Update the in-memory value after the line store was rewritten.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// A gradient stop: a value and its time key.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStop {
    pub value: ColorValue,
    pub time: f32,
}

/// One of the four color-bearing emitter properties.
///
/// Either `inline` is set (`color: vec4 = { ... }`) or the property is an
/// embedded `ValueColor` with an optional constant and time-keyed stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorProperty {
    pub(crate) field: ColorField,
    pub(crate) range: LineRange,
    pub(crate) inline: Option<ColorValue>,
    pub(crate) constant: Option<ColorValue>,
    pub(crate) stops: Vec<ColorStop>,
}

impl ColorProperty {
    pub fn field(&self) -> ColorField {
        self.field
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    pub fn inline(&self) -> Option<&ColorValue> {
        self.inline.as_ref()
    }

    pub fn constant(&self) -> Option<&ColorValue> {
        self.constant.as_ref()
    }

    /// Stops ordered by non-decreasing time.
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn is_gradient(&self) -> bool {
        !self.stops.is_empty()
    }

    /// Every value paired with its time.
    ///
    /// Inline and constant values sit at the first stop's time, or at 0 when
    /// there is no gradient, which makes a lone constant a one-stop gradient.
    pub fn entries(&self) -> Vec<(f32, &ColorValue)> {
        let base_time = self.stops.first().map_or(0.0, |stop| stop.time);
        self.inline
            .iter()
            .chain(self.constant.iter())
            .map(|value| (base_time, value))
            .chain(self.stops.iter().map(|stop| (stop.time, &stop.value)))
            .collect()
    }

    /// Mutable access to every value paired with its time.
    pub fn values_mut(&mut self) -> Vec<(f32, &mut ColorValue)> {
        let base_time = self.stops.first().map_or(0.0, |stop| stop.time);
        self.inline
            .iter_mut()
            .chain(self.constant.iter_mut())
            .map(|value| (base_time, value))
            .chain(self.stops.iter_mut().map(|stop| (stop.time, &mut stop.value)))
            .collect()
    }

    /// The `(min, max)` time covered by the property.
    pub fn time_range(&self) -> (f32, f32) {
        let first = self.stops.first().map_or(0.0, |stop| stop.time);
        let last = self.stops.last().map_or(first, |stop| stop.time);
        (first, last)
    }
}

/// The `blendMode` line of an emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendMode {
    pub(crate) line: usize,
    pub(crate) value: u8,
}

impl BlendMode {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }
}

/// A resource path found inside an emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub(crate) line: usize,
    pub(crate) path: String,
}

impl AssetRef {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last path segment.
    pub fn filename(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }
}

/// A `VfxEmitterDefinitionData` block.
#[derive(Debug, Clone, PartialEq)]
pub struct VfxEmitter {
    pub(crate) key: String,
    pub(crate) system_key: String,
    pub(crate) ordinal: usize,
    pub(crate) range: LineRange,
    pub(crate) name: Option<String>,
    pub(crate) blend_mode: Option<BlendMode>,
    pub(crate) assets: Vec<AssetRef>,
    pub(crate) colors: Vec<ColorProperty>,
    pub(crate) children: Vec<String>,
    pub(crate) single_particle: bool,
    pub(crate) children_probability: bool,
}

impl VfxEmitter {
    /// Synthetic key `<system>__emitter_<ordinal>`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn system_key(&self) -> &str {
        &self.system_key
    }

    /// Zero-based position among the system's emitters.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_EMITTER)
    }

    pub fn blend_mode(&self) -> Option<&BlendMode> {
        self.blend_mode.as_ref()
    }

    pub fn blend_mode_mut(&mut self) -> Option<&mut BlendMode> {
        self.blend_mode.as_mut()
    }

    pub fn assets(&self) -> &[AssetRef] {
        &self.assets
    }

    pub fn colors(&self) -> &[ColorProperty] {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut [ColorProperty] {
        &mut self.colors
    }

    pub fn color(&self, field: ColorField) -> Option<&ColorProperty> {
        self.colors.iter().find(|property| property.field == field)
    }

    /// Keys referenced through `effect`-style links, in textual order.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Whether `isSingleParticle` is set to `true`.
    pub fn is_single_particle(&self) -> bool {
        self.single_particle
    }

    /// A randomizer: a single-particle `*_randomized` emitter that picks
    /// one of its children through `childrenProbability`.
    ///
    /// Emitters that merely spawn child systems are not randomizers.
    pub fn is_randomizer(&self) -> bool {
        self.single_particle
            && self.children_probability
            && !self.children.is_empty()
            && self.name.as_deref().is_some_and(|name| {
                name.len()
                    .checked_sub(RANDOMIZED_SUFFIX.len())
                    .and_then(|start| name.get(start..))
                    .is_some_and(|tail| tail.eq_ignore_ascii_case(RANDOMIZED_SUFFIX))
            })
    }
}

/// A `VfxSystemDefinitionData` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct VfxSystem {
    pub(crate) key: String,
    pub(crate) range: LineRange,
    pub(crate) particle_name: Option<String>,
    pub(crate) particle_path: Option<String>,
    pub(crate) emitters: Vec<String>,
    pub(crate) emitter_lists: Vec<LineRange>,
}

impl VfxSystem {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    pub fn particle_name(&self) -> Option<&str> {
        self.particle_name.as_deref()
    }

    pub fn particle_path(&self) -> Option<&str> {
        self.particle_path.as_deref()
    }

    /// `particleName` when present, otherwise the last segment of the key.
    pub fn display_name(&self) -> &str {
        self.particle_name
            .as_deref()
            .unwrap_or_else(|| short_name(&self.key))
    }

    /// Emitter keys in textual order.
    pub fn emitters(&self) -> &[String] {
        &self.emitters
    }

    /// Ranges of the `complexEmitterDefinitionData` (and similar) lists.
    pub fn emitter_lists(&self) -> &[LineRange] {
        &self.emitter_lists
    }
}

/// A `StaticMaterialShaderParamDef` with a `vec4` value.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorParam {
    pub(crate) name: String,
    pub(crate) range: LineRange,
    pub(crate) value: ColorValue,
}

impl ColorParam {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    pub fn value(&self) -> &ColorValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut ColorValue {
        &mut self.value
    }
}

/// A `StaticMaterialDef` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub(crate) key: String,
    pub(crate) range: LineRange,
    pub(crate) name: Option<String>,
    pub(crate) params: Vec<ColorParam>,
}

impl Material {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn params(&self) -> &[ColorParam] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut [ColorParam] {
        &mut self.params
    }
}

/// The `resourceMap: map[hash,link]` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMap {
    pub(crate) range: LineRange,
    pub(crate) entries: Vec<(String, String)>,
    pub(crate) entry_indent: Option<String>,
}

impl ResourceMap {
    pub fn range(&self) -> LineRange {
        self.range
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Indentation of the last entry, if the map has any.
    pub fn entry_indent(&self) -> Option<&str> {
        self.entry_indent.as_deref()
    }

    /// Line holding the map's closing delimiter.
    pub fn close_line(&self) -> usize {
        self.range.last().unwrap_or(self.range.start())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(key))
    }
}

/// Result of indexing a document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub(crate) systems: IndexMap<String, VfxSystem>,
    pub(crate) emitters: IndexMap<String, VfxEmitter>,
    pub(crate) materials: IndexMap<String, Material>,
    pub(crate) entry_keys: IndexSet<String>,
    pub(crate) resource_map: Option<ResourceMap>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl ParsedDocument {
    pub fn systems(&self) -> impl Iterator<Item = &VfxSystem> {
        self.systems.values()
    }

    pub fn system(&self, key: &str) -> Option<&VfxSystem> {
        self.systems.get(key)
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn emitters(&self) -> impl Iterator<Item = &VfxEmitter> {
        self.emitters.values()
    }

    pub fn emitter(&self, key: &str) -> Option<&VfxEmitter> {
        self.emitters.get(key)
    }

    pub fn emitter_mut(&mut self, key: &str) -> Option<&mut VfxEmitter> {
        self.emitters.get_mut(key)
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Emitters owned by `system_key`, in textual order.
    pub fn emitters_of<'a>(
        &'a self,
        system_key: &str,
    ) -> impl Iterator<Item = &'a VfxEmitter> + use<'a> {
        self.systems
            .get(system_key)
            .map(|system| system.emitters.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|key| self.emitters.get(key))
    }

    /// First emitter of `system_key` whose name matches `name`.
    ///
    /// Unnamed emitters are never returned, not even for `"Unnamed"`.
    pub fn find_emitter(&self, system_key: &str, name: &str) -> Option<&VfxEmitter> {
        self.emitters_of(system_key)
            .find(|emitter| emitter.name().is_some_and(|own| own == name))
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn material(&self, key: &str) -> Option<&Material> {
        self.materials.get(key)
    }

    pub fn material_mut(&mut self, key: &str) -> Option<&mut Material> {
        self.materials.get_mut(key)
    }

    pub fn resource_map(&self) -> Option<&ResourceMap> {
        self.resource_map.as_ref()
    }

    /// Returns `true` if `key` names any entry, system or map key
    /// (case-insensitive).
    pub fn has_key(&self, key: &str) -> bool {
        let lowered = key.to_ascii_lowercase();
        self.entry_keys.contains(&lowered)
            || self.systems.keys().any(|own| own.eq_ignore_ascii_case(key))
            || self
                .resource_map
                .as_ref()
                .is_some_and(|map| map.contains_key(key))
    }

    /// Systems with no entry in the resource map.
    pub fn unregistered_systems(&self) -> Vec<&VfxSystem> {
        self.systems
            .values()
            .filter(|system| {
                !self
                    .resource_map
                    .as_ref()
                    .is_some_and(|map| map.contains_key(&system.key))
            })
            .collect()
    }

    /// Warnings produced while indexing.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// The last `/`-separated segment of a key.
pub fn short_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
