//! Single-pass document indexer.
//!
//! The indexer walks the line store once, tracking brace depth and one
//! "current object" pointer per kind of interesting block. Each pointer
//! remembers the depth at which its block opened (its floor); when a line
//! brings the depth back to or below that floor the block is finished and
//! moved into the catalogs of the [`ParsedDocument`].

use log::{debug, trace};
use quartz_core::{
    color::Color,
    field::ColorField,
    lines::{LineRange, LineStore, ScanMode, ValueCoord, indent_of, vector_spans},
};

use crate::{
    document::{
        AssetRef, BlendMode, ColorParam, ColorProperty, ColorStop, ColorValue, Material,
        ParsedDocument, ResourceMap, VfxEmitter, VfxSystem,
    },
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lexer::{self, FieldDecl},
    scan,
    span::Span,
};

pub const SYSTEM_TYPE: &str = "VfxSystemDefinitionData";
pub const EMITTER_TYPE: &str = "VfxEmitterDefinitionData";
pub const MATERIAL_TYPE: &str = "StaticMaterialDef";
pub const PARAM_TYPE: &str = "StaticMaterialShaderParamDef";
pub const RESOURCE_MAP_FIELD: &str = "resourceMap";

/// Fields of a system that hold its emitter definitions.
pub const EMITTER_LIST_FIELDS: [&str; 2] =
    ["complexEmitterDefinitionData", "simpleEmitterDefinitionData"];

/// Fields whose value links an emitter to a child system.
pub const CHILD_LINK_FIELDS: [&str; 3] = ["effect", "effectKey", "effectName"];

/// Indexer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    asset_root: String,
    scan_mode: ScanMode,
}

impl IndexConfig {
    pub fn new(asset_root: impl Into<String>, scan_mode: ScanMode) -> Self {
        Self {
            asset_root: asset_root.into(),
            scan_mode,
        }
    }

    /// Top-level folder every resource path starts with.
    pub fn asset_root(&self) -> &str {
        &self.asset_root
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }

    pub fn with_scan_mode(mut self, scan_mode: ScanMode) -> Self {
        self.scan_mode = scan_mode;
        self
    }

    /// Returns `true` if `path` begins with `<asset_root>/`, ignoring case.
    pub fn is_asset_path(&self, path: &str) -> bool {
        let root_len = self.asset_root.len();
        path.len() > root_len + 1
            && path
                .get(..root_len)
                .is_some_and(|head| head.eq_ignore_ascii_case(&self.asset_root))
            && matches!(path.as_bytes()[root_len], b'/' | b'\\')
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new("ASSETS", ScanMode::default())
    }
}

/// Index `store` into systems, emitters, materials and the resource map.
///
/// Indexing never fails. Unclosed blocks are discarded and stray closing
/// delimiters ignored; both are reported through
/// [`ParsedDocument::diagnostics`].
pub fn index_document(store: &LineStore, config: &IndexConfig) -> ParsedDocument {
    let mut indexer = Indexer::new(store, config);
    let mut depth = 0usize;

    for (index, line) in store.lines().iter().enumerate() {
        let (opens, closes) = scan::brace_delta(line, config.scan_mode());
        let raised = depth + opens;
        let after = if closes > raised {
            indexer.emit(
                Diagnostic::warning("unexpected closing delimiter")
                    .with_code(ErrorCode::E002)
                    .with_label(indexer.span(index), "no open block to close")
                    .with_help("depth was reset to zero"),
            );
            0
        } else {
            raised - closes
        };

        indexer.classify(index, line, depth, after);
        indexer.close_finished(index, after);
        depth = after;
    }

    indexer.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Times,
    Values,
}

#[derive(Debug)]
struct SystemFrame {
    key: String,
    start: usize,
    floor: usize,
    particle_name: Option<String>,
    particle_path: Option<String>,
    emitter_lists: Vec<LineRange>,
    emitters: Vec<VfxEmitter>,
}

#[derive(Debug)]
struct ListFrame {
    start: usize,
    floor: usize,
}

#[derive(Debug)]
struct EmitterFrame {
    emitter: VfxEmitter,
    floor: usize,
}

#[derive(Debug)]
struct ColorFrame {
    field: ColorField,
    start: usize,
    floor: usize,
    constant: Option<ColorValue>,
    times: Vec<f32>,
    values: Vec<ColorValue>,
    list: Option<(ListKind, usize)>,
}

#[derive(Debug)]
struct MaterialFrame {
    material: Material,
    floor: usize,
}

#[derive(Debug)]
struct ParamFrame {
    start: usize,
    floor: usize,
    name: Option<String>,
    value: Option<ColorValue>,
}

#[derive(Debug)]
struct MapFrame {
    start: usize,
    floor: usize,
    entries: Vec<(String, String)>,
    entry_indent: Option<String>,
}

struct Indexer<'a> {
    store: &'a LineStore,
    config: &'a IndexConfig,
    doc: ParsedDocument,
    diagnostics: DiagnosticCollector,
    system: Option<SystemFrame>,
    emitter_list: Option<ListFrame>,
    emitter: Option<EmitterFrame>,
    color: Option<ColorFrame>,
    material: Option<MaterialFrame>,
    param: Option<ParamFrame>,
    map: Option<MapFrame>,
}

impl<'a> Indexer<'a> {
    fn new(store: &'a LineStore, config: &'a IndexConfig) -> Self {
        Self {
            store,
            config,
            doc: ParsedDocument::default(),
            diagnostics: DiagnosticCollector::new(),
            system: None,
            emitter_list: None,
            emitter: None,
            color: None,
            material: None,
            param: None,
            map: None,
        }
    }

    fn span(&self, line: usize) -> Span {
        Span::new(self.store.line_span(line))
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.emit(diagnostic);
    }

    fn classify(&mut self, index: usize, line: &str, before: usize, after: usize) {
        if let Some(map) = self.map.as_mut() {
            if let Some((key, value)) = lexer::map_entry(line) {
                map.entries.push((key.to_string(), value.to_string()));
                map.entry_indent = Some(indent_of(line).to_string());
            }
            return;
        }

        let decl = lexer::field_decl(line);
        if let Some(decl) = decl
            && decl.is(RESOURCE_MAP_FIELD)
            && decl.value.starts_with('{')
        {
            self.map = Some(MapFrame {
                start: index,
                floor: before,
                entries: Vec::new(),
                entry_indent: None,
            });
            return;
        }

        if self.material.is_some() {
            self.classify_material(index, line, before, decl);
            return;
        }

        if self.system.is_none() {
            self.classify_entry(index, line, before);
            return;
        }

        if self.emitter.is_some() {
            self.classify_emitter(index, line, before, after, decl);
        } else {
            self.classify_system(index, line, before, after, decl);
        }
    }

    fn classify_entry(&mut self, index: usize, line: &str, before: usize) {
        let Some(header) = lexer::entry_header(line) else {
            return;
        };
        self.doc
            .entry_keys
            .insert(header.key.to_ascii_lowercase());

        if header.type_name.eq_ignore_ascii_case(SYSTEM_TYPE) {
            self.system = Some(SystemFrame {
                key: header.key.to_string(),
                start: index,
                floor: before,
                particle_name: None,
                particle_path: None,
                emitter_lists: Vec::new(),
                emitters: Vec::new(),
            });
        } else if header.type_name.eq_ignore_ascii_case(MATERIAL_TYPE) {
            self.material = Some(MaterialFrame {
                material: Material {
                    key: header.key.to_string(),
                    range: LineRange::new(index, index + 1),
                    name: None,
                    params: Vec::new(),
                },
                floor: before,
            });
        }
    }

    fn classify_system(
        &mut self,
        index: usize,
        line: &str,
        before: usize,
        after: usize,
        decl: Option<FieldDecl<'_>>,
    ) {
        let Some(system) = self.system.as_mut() else {
            return;
        };

        if lexer::opens_struct(line, EMITTER_TYPE) {
            let ordinal = system.emitters.len();
            self.emitter = Some(EmitterFrame {
                emitter: VfxEmitter {
                    key: emitter_key(&system.key, ordinal),
                    system_key: system.key.clone(),
                    ordinal,
                    range: LineRange::new(index, index + 1),
                    name: None,
                    blend_mode: None,
                    assets: Vec::new(),
                    colors: Vec::new(),
                    children: Vec::new(),
                    single_particle: false,
                    children_probability: false,
                },
                floor: before,
            });

            // `VfxEmitterDefinitionData { emitterName: string = "X" }`
            if let Some((_, rest)) = line.split_once('{')
                && !rest.trim().is_empty()
            {
                self.classify_emitter(index, rest, before + 1, after, lexer::field_decl(rest));
            }
            return;
        }

        let Some(decl) = decl else {
            return;
        };
        if decl.is("particleName") {
            system.particle_name = lexer::leading_key(decl.value).map(String::from);
        } else if decl.is("particlePath") {
            system.particle_path = lexer::leading_key(decl.value).map(String::from);
        } else if EMITTER_LIST_FIELDS.iter().any(|field| decl.is(field))
            && decl.value.starts_with('{')
            && self.emitter_list.is_none()
        {
            self.emitter_list = Some(ListFrame {
                start: index,
                floor: before,
            });
        }
    }

    fn classify_emitter(
        &mut self,
        index: usize,
        line: &str,
        before: usize,
        after: usize,
        decl: Option<FieldDecl<'_>>,
    ) {
        let Some(frame) = self.emitter.as_mut() else {
            return;
        };

        for literal in lexer::string_literals(line) {
            if self.config.is_asset_path(literal) {
                frame.emitter.assets.push(AssetRef {
                    line: index,
                    path: literal.to_string(),
                });
            }
        }

        // Single-line child identifiers carry their field after the brace.
        let decl = decl.or_else(|| {
            let (_, rest) = line.split_once('{')?;
            lexer::field_decl(rest)
        });

        if let Some(decl) = decl
            && CHILD_LINK_FIELDS.iter().any(|field| decl.is(field))
            && let Some(child) = lexer::leading_key(decl.value)
        {
            if !frame.emitter.children.iter().any(|known| known == child) {
                frame.emitter.children.push(child.to_string());
            }
            return;
        }

        if self.color.is_some() {
            self.classify_color(index, line, before, after, decl);
            return;
        }

        let Some(decl) = decl else {
            return;
        };
        if decl.is("emitterName") {
            frame.emitter.name = lexer::leading_key(decl.value).map(String::from);
        } else if decl.is("isSingleParticle") && before == frame.floor + 1 {
            frame.emitter.single_particle = decl
                .value
                .split_whitespace()
                .next()
                .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        } else if decl.is("childrenProbability") && before == frame.floor + 1 {
            frame.emitter.children_probability = true;
        } else if decl.is("blendMode") {
            if let Some(value) = lexer::number(decl.value) {
                frame.emitter.blend_mode = Some(BlendMode {
                    line: index,
                    value: value.clamp(0.0, 255.0) as u8,
                });
            }
        } else if before == frame.floor + 1
            && let Some(field) = ColorField::from_field_name(decl.name)
        {
            if let Some(values) = lexer::vector(decl.value) {
                match color_value(index, 0, &values) {
                    Some(inline) => frame.emitter.colors.push(ColorProperty {
                        field,
                        range: LineRange::new(index, index + 1),
                        inline: Some(inline),
                        constant: None,
                        stops: Vec::new(),
                    }),
                    None => self.warn_malformed(index, field),
                }
            } else if lexer::struct_open(decl.value).is_some() {
                self.color = Some(ColorFrame {
                    field,
                    start: index,
                    floor: before,
                    constant: None,
                    times: Vec::new(),
                    values: Vec::new(),
                    list: None,
                });
            }
        }
    }

    fn classify_color(
        &mut self,
        index: usize,
        line: &str,
        before: usize,
        after: usize,
        decl: Option<FieldDecl<'_>>,
    ) {
        let Some(frame) = self.color.as_mut() else {
            return;
        };

        if let Some((kind, _)) = frame.list {
            match kind {
                ListKind::Times => {
                    if let Some(times) = lexer::number_list(line) {
                        frame.times.extend(times);
                    }
                }
                ListKind::Values => {
                    let field = frame.field;
                    let (values, malformed) = line_values(index, line);
                    frame.values.extend(values);
                    if malformed {
                        self.warn_malformed(index, field);
                    }
                }
            }
            return;
        }

        let Some(decl) = decl else {
            return;
        };
        let single_line = after <= before;
        if decl.is("constantValue") {
            match lexer::vector(decl.value).and_then(|values| color_value(index, 0, &values)) {
                Some(constant) => frame.constant = Some(constant),
                None => {
                    let field = frame.field;
                    self.warn_malformed(index, field);
                }
            }
        } else if decl.is("times") {
            if single_line {
                frame
                    .times
                    .extend(lexer::vector(decl.value).unwrap_or_default());
            } else {
                frame.list = Some((ListKind::Times, before));
            }
        } else if decl.is("values") {
            if single_line {
                let field = frame.field;
                let (values, malformed) = line_values(index, line);
                frame.values.extend(values);
                if malformed {
                    self.warn_malformed(index, field);
                }
            } else {
                frame.list = Some((ListKind::Values, before));
            }
        }
    }

    fn classify_material(
        &mut self,
        index: usize,
        line: &str,
        before: usize,
        decl: Option<FieldDecl<'_>>,
    ) {
        if let Some(param) = self.param.as_mut() {
            let Some(decl) = decl else {
                return;
            };
            if decl.is("name") {
                param.name = lexer::leading_key(decl.value).map(String::from);
            } else if decl.is("value") {
                param.value = lexer::vector(decl.value)
                    .and_then(|values| color_value(index, 0, &values));
            }
            return;
        }

        let Some(material) = self.material.as_mut() else {
            return;
        };
        if lexer::opens_struct(line, PARAM_TYPE) {
            self.param = Some(ParamFrame {
                start: index,
                floor: before,
                name: None,
                value: None,
            });
        } else if let Some(decl) = decl
            && decl.is("name")
            && material.material.name.is_none()
        {
            material.material.name = lexer::leading_key(decl.value).map(String::from);
        }
    }

    /// Close every open block whose floor the depth has returned to,
    /// innermost first.
    fn close_finished(&mut self, index: usize, after: usize) {
        if let Some(frame) = self.color.as_mut()
            && frame.list.is_some_and(|(_, floor)| after <= floor)
        {
            frame.list = None;
        }
        if self.color.as_ref().is_some_and(|frame| after <= frame.floor)
            && let Some(frame) = self.color.take()
        {
            self.finish_color(frame, index);
        }

        if self.emitter.as_ref().is_some_and(|frame| after <= frame.floor)
            && let Some(mut frame) = self.emitter.take()
        {
            frame.emitter.range = LineRange::new(frame.emitter.range.start(), index + 1);
            if let Some(system) = self.system.as_mut() {
                system.emitters.push(frame.emitter);
            }
        }

        if self.emitter_list.as_ref().is_some_and(|frame| after <= frame.floor)
            && let Some(frame) = self.emitter_list.take()
            && let Some(system) = self.system.as_mut()
        {
            system
                .emitter_lists
                .push(LineRange::new(frame.start, index + 1));
        }

        if self.system.as_ref().is_some_and(|frame| after <= frame.floor)
            && let Some(frame) = self.system.take()
        {
            self.finish_system(frame, index);
        }

        if self.param.as_ref().is_some_and(|frame| after <= frame.floor)
            && let Some(frame) = self.param.take()
            && let Some(material) = self.material.as_mut()
            && let (Some(name), Some(value)) = (frame.name, frame.value)
        {
            material.material.params.push(ColorParam {
                name,
                range: LineRange::new(frame.start, index + 1),
                value,
            });
        }

        if self.material.as_ref().is_some_and(|frame| after <= frame.floor)
            && let Some(mut frame) = self.material.take()
        {
            frame.material.range = LineRange::new(frame.material.range.start(), index + 1);
            self.doc
                .materials
                .insert(frame.material.key.clone(), frame.material);
        }

        if self.map.as_ref().is_some_and(|frame| after <= frame.floor)
            && let Some(frame) = self.map.take()
        {
            self.doc.resource_map = Some(ResourceMap {
                range: LineRange::new(frame.start, index + 1),
                entries: frame.entries,
                entry_indent: frame.entry_indent,
            });
        }
    }

    fn finish_color(&mut self, frame: ColorFrame, index: usize) {
        let mut times = frame.times;
        if !times.is_empty() && times.len() != frame.values.len() {
            self.emit(
                Diagnostic::warning(format!(
                    "`{}` has {} times but {} values",
                    frame.field.field_name(),
                    times.len(),
                    frame.values.len()
                ))
                .with_code(ErrorCode::E101)
                .with_label(self.span(frame.start), "gradient declared here")
                .with_help("unpaired entries were ignored"),
            );
        }
        if times.is_empty() {
            times = spread_times(frame.values.len());
        }

        let mut stops: Vec<ColorStop> = frame
            .values
            .into_iter()
            .zip(times)
            .map(|(value, time)| ColorStop { value, time })
            .collect();
        stops.sort_by(|a, b| a.time.total_cmp(&b.time));

        if frame.constant.is_none() && stops.is_empty() {
            return;
        }
        if let Some(emitter) = self.emitter.as_mut() {
            emitter.emitter.colors.push(ColorProperty {
                field: frame.field,
                range: LineRange::new(frame.start, index + 1),
                inline: None,
                constant: frame.constant,
                stops,
            });
        }
    }

    fn finish_system(&mut self, frame: SystemFrame, index: usize) {
        let mut emitter_keys = Vec::with_capacity(frame.emitters.len());
        for emitter in frame.emitters {
            emitter_keys.push(emitter.key.clone());
            self.doc.emitters.insert(emitter.key.clone(), emitter);
        }
        let system = VfxSystem {
            key: frame.key,
            range: LineRange::new(frame.start, index + 1),
            particle_name: frame.particle_name,
            particle_path: frame.particle_path,
            emitters: emitter_keys,
            emitter_lists: frame.emitter_lists,
        };
        trace!(system:? = system; "Indexed system");
        if self.doc.systems.contains_key(&system.key) {
            debug!(key = system.key.as_str(); "Duplicate system key, keeping the later block");
        }
        self.doc.systems.insert(system.key.clone(), system);
    }

    fn warn_malformed(&mut self, index: usize, field: ColorField) {
        self.emit(
            Diagnostic::warning(format!("malformed `{}` value", field.field_name()))
                .with_code(ErrorCode::E100)
                .with_label(self.span(index), "expected `{ r, g, b }` or `{ r, g, b, a }`"),
        );
    }

    fn warn_unclosed(&mut self, what: &str, start: usize) {
        self.emit(
            Diagnostic::warning(format!("{what} is never closed"))
                .with_code(ErrorCode::E001)
                .with_label(self.span(start), "opened here")
                .with_help("the block was skipped; other blocks are unaffected"),
        );
    }

    fn finish(mut self) -> ParsedDocument {
        if let Some(frame) = self.system.take() {
            self.warn_unclosed(&format!("system `{}`", frame.key), frame.start);
        }
        if let Some(frame) = self.material.take() {
            self.warn_unclosed(
                &format!("material `{}`", frame.material.key),
                frame.material.range.start(),
            );
        }
        if let Some(frame) = self.map.take() {
            self.warn_unclosed("resource map", frame.start);
        }

        self.doc.diagnostics = self.diagnostics.into_diagnostics();
        debug!(
            systems = self.doc.systems.len(),
            emitters = self.doc.emitters.len(),
            materials = self.doc.materials.len(),
            warnings = self.doc.diagnostics.len();
            "Document indexed"
        );
        self.doc
    }
}

/// Synthetic emitter key: `<system>__emitter_<ordinal>`.
pub fn emitter_key(system_key: &str, ordinal: usize) -> String {
    format!("{system_key}__emitter_{ordinal}")
}

fn color_value(line: usize, slot: usize, values: &[f32]) -> Option<ColorValue> {
    Color::from_slice(values)
        .map(|color| ColorValue::new(ValueCoord::new(line, slot), color, values.len()))
}

/// Color values of every innermost vector group on a line, and whether any
/// group failed to parse as a color.
fn line_values(line_index: usize, line: &str) -> (Vec<ColorValue>, bool) {
    let mut values = Vec::new();
    let mut malformed = false;
    for (slot, span) in vector_spans(line).into_iter().enumerate() {
        match lexer::vector(&line[span]) {
            Some(components) if components.is_empty() => {}
            Some(components) => match color_value(line_index, slot, &components) {
                Some(value) => values.push(value),
                None => malformed = true,
            },
            None => malformed = true,
        }
    }
    (values, malformed)
}

/// Evenly spaced times in `[0, 1]` for a gradient without a `times` list.
fn spread_times(count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..count)
            .map(|index| index as f32 / (count - 1) as f32)
            .collect(),
    }
}
