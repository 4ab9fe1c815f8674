//! Color transformation.
//!
//! Colors are rewritten through the value coordinates recorded by the
//! indexer: each mutation replaces one vector literal in the line store and
//! updates the in-memory value, so repeated operations see consistent state
//! without re-indexing. A call either applies every write or none.

mod blend;
mod filter;
mod palette;

pub use blend::set_blend_mode;
pub use filter::ColorFilter;
pub use palette::{Palette, PaletteStop};

use log::{debug, info};
use rand::Rng;

use quartz_core::{color::Color, field::ColorField, lines::LineStore};
use quartz_parser::{
    ColorValue,
    error::{Diagnostic, ErrorCode},
};

use crate::Document;

/// Re-roll attempts when a random pick lands on pure black or white.
const MAX_REROLLS: usize = 32;

/// How a new color is derived from the current one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecolorMode {
    /// Independent uniform pick from the palette for every value.
    Random,
    /// Sample the palette at the value's time, mapped from the property's
    /// time range onto the palette's.
    Linear,
    /// Additive hue (degrees), saturation and lightness (percent) deltas.
    Shift {
        hue: f32,
        saturation: f32,
        lightness: f32,
    },
    /// Replace the hue, keeping saturation and lightness.
    ShiftHue(f32),
}

impl RecolorMode {
    pub fn needs_palette(&self) -> bool {
        matches!(self, RecolorMode::Random | RecolorMode::Linear)
    }
}

/// Which emitters a recolor applies to.
///
/// Empty `systems` selects every system. Empty `emitter_names` selects every
/// emitter of the chosen systems; otherwise only named emitters match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    pub systems: Vec<String>,
    pub emitter_names: Vec<String>,
}

impl Targets {
    pub fn all() -> Self {
        Self::default()
    }

    /// Resolve the selection against `doc` into emitter keys.
    pub fn emitter_keys(&self, doc: &Document) -> Vec<String> {
        doc.index()
            .systems()
            .filter(|system| {
                self.systems.is_empty() || self.systems.iter().any(|key| key == system.key())
            })
            .flat_map(|system| doc.index().emitters_of(system.key()))
            .filter(|emitter| {
                self.emitter_names.is_empty()
                    || emitter
                        .name()
                        .is_some_and(|name| self.emitter_names.iter().any(|wanted| wanted == name))
            })
            .map(|emitter| emitter.key().to_string())
            .collect()
    }
}

/// A complete recolor operation.
#[derive(Debug, Clone)]
pub struct RecolorRequest {
    pub fields: Vec<ColorField>,
    pub mode: RecolorMode,
    pub palette: Option<Palette>,
    pub filter: Option<ColorFilter>,
    pub ignore_black_white: bool,
    pub targets: Targets,
}

impl RecolorRequest {
    pub fn new(mode: RecolorMode) -> Self {
        Self {
            fields: ColorField::ALL.to_vec(),
            mode,
            palette: None,
            filter: None,
            ignore_black_white: false,
            targets: Targets::all(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<ColorField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_filter(mut self, filter: ColorFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.targets = targets;
        self
    }

    pub fn ignoring_black_white(mut self, ignore: bool) -> Self {
        self.ignore_black_white = ignore;
        self
    }

    fn palette(&self) -> Result<Option<&Palette>, Diagnostic> {
        match (&self.palette, self.mode.needs_palette()) {
            (Some(palette), _) if !palette.is_empty() => Ok(Some(palette)),
            (_, true) => Err(Diagnostic::error("this recolor mode needs a palette")
                .with_code(ErrorCode::E302)
                .with_help("pass palette colors or name a palette from the configuration")),
            (_, false) => Ok(None),
        }
    }
}

/// Counts of what a recolor touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecolorReport {
    pub properties: usize,
    pub values: usize,
}

/// Recolor the selected emitter color properties of `doc`.
pub fn recolor<R: Rng + ?Sized>(
    doc: &mut Document,
    request: &RecolorRequest,
    rng: &mut R,
) -> Result<RecolorReport, Diagnostic> {
    let palette = request.palette()?;
    let keys = request.targets.emitter_keys(doc);
    info!(emitters = keys.len(), mode:? = request.mode; "Recoloring emitters");

    let mut lines = doc.lines().clone();
    let mut index = doc.index().clone();
    let mut report = RecolorReport::default();

    for key in &keys {
        let Some(emitter) = index.emitter_mut(key) else {
            continue;
        };
        for property in emitter.colors_mut() {
            if !request.fields.contains(&property.field()) {
                continue;
            }
            let time_range = property.time_range();
            let mut touched = 0;
            for (time, value) in property.values_mut() {
                if apply(&mut lines, value, time, time_range, request, palette, rng)? {
                    touched += 1;
                }
            }
            if touched > 0 {
                report.properties += 1;
                report.values += touched;
            }
        }
    }

    doc.commit(lines, index);
    debug!(properties = report.properties, values = report.values; "Recolor applied");
    Ok(report)
}

/// Recolor `vec4` shader params of static materials.
///
/// `materials` selects materials by key and `param_names` selects params by
/// name (case-insensitive); an empty list selects everything. Each param is
/// a single value at time 0.
///
/// # Errors
///
/// `E206` when a selected material does not exist, `E302` when the mode
/// needs a palette and none was given.
pub fn recolor_materials<R: Rng + ?Sized>(
    doc: &mut Document,
    request: &RecolorRequest,
    materials: &[String],
    param_names: &[String],
    rng: &mut R,
) -> Result<RecolorReport, Diagnostic> {
    let palette = request.palette()?;
    if let Some(missing) = materials.iter().find(|key| doc.index().material(key).is_none()) {
        return Err(Diagnostic::error(format!("unknown material `{missing}`"))
            .with_code(ErrorCode::E206));
    }
    let keys: Vec<String> = if materials.is_empty() {
        doc.index()
            .materials()
            .map(|material| material.key().to_string())
            .collect()
    } else {
        materials.to_vec()
    };
    info!(materials = keys.len(), mode:? = request.mode; "Recoloring materials");

    let mut lines = doc.lines().clone();
    let mut index = doc.index().clone();
    let mut report = RecolorReport::default();

    for key in &keys {
        let Some(material) = index.material_mut(key) else {
            continue;
        };
        for param in material.params_mut() {
            let selected = param_names.is_empty()
                || param_names
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(param.name()));
            if !selected {
                continue;
            }
            if apply(&mut lines, param.value_mut(), 0.0, (0.0, 0.0), request, palette, rng)? {
                report.properties += 1;
                report.values += 1;
            }
        }
    }

    doc.commit(lines, index);
    debug!(params = report.values; "Material recolor applied");
    Ok(report)
}

/// Compute and write the new color of one value. Returns `false` when the
/// filter skipped it.
fn apply<R: Rng + ?Sized>(
    lines: &mut LineStore,
    value: &mut ColorValue,
    time: f32,
    time_range: (f32, f32),
    request: &RecolorRequest,
    palette: Option<&Palette>,
    rng: &mut R,
) -> Result<bool, Diagnostic> {
    let current = value.color();
    if let Some(filter) = &request.filter
        && !filter.matches(current)
    {
        return Ok(false);
    }

    let next = match (request.mode, palette) {
        (RecolorMode::Random, Some(palette)) => {
            random_pick(palette, request.ignore_black_white, rng).with_alpha(current.alpha())
        }
        (RecolorMode::Linear, Some(palette)) => palette
            .sample(map_time(time, time_range, palette.time_range()))
            .with_alpha(current.alpha()),
        (
            RecolorMode::Shift {
                hue,
                saturation,
                lightness,
            },
            _,
        ) => current.shift_hsl(hue, saturation, lightness),
        (RecolorMode::ShiftHue(hue), _) => current.with_hue(hue),
        (RecolorMode::Random | RecolorMode::Linear, None) => return Ok(false),
    };

    let written = ColorValue::new(value.coord(), next, value.width());
    lines
        .write_vector(value.coord(), &written.literal())
        .map_err(|err| {
            Diagnostic::error(err.to_string())
                .with_code(ErrorCode::E303)
                .with_help("re-index the document before recoloring")
        })?;
    value.set_color(next);
    Ok(true)
}

fn random_pick<R: Rng + ?Sized>(palette: &Palette, ignore_black_white: bool, rng: &mut R) -> Color {
    let mut color = palette.pick(rng);
    if !ignore_black_white || palette.is_black_and_white() {
        return color;
    }
    for _ in 0..MAX_REROLLS {
        if !color.is_black_or_white() {
            break;
        }
        color = palette.pick(rng);
    }
    color
}

/// Map `time` from the property's range onto the palette's range. A
/// property without a time span maps to the palette's first stop.
fn map_time(time: f32, (from_start, from_end): (f32, f32), (to_start, to_end): (f32, f32)) -> f32 {
    let span = from_end - from_start;
    if span <= f32::EPSILON {
        return to_start;
    }
    let unit = ((time - from_start) / span).clamp(0.0, 1.0);
    to_start + unit * (to_end - to_start)
}
