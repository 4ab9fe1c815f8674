//! CLI logic for the Quartz VFX tool.
//!
//! Each subcommand reads one document, runs a single operation through the
//! `quartz` library and writes the result back (or prints a summary).

pub mod assets;
pub mod error_adapter;
pub mod report;

mod args;
mod config;

pub use args::{
    Args, BlendModeArgs, Command, EditArgs, InputArgs, ModeArg, RandomizeArgs, RecolorArgs,
    SplitArgs,
};

use std::{fs, path::Path};

use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};

use quartz::{
    Diagnostic, DiagnosticError, Document, ErrorCode, QuartzError,
    color::Color,
    config::AppConfig,
    recolor::{
        self, ColorFilter, Palette, RecolorMode, RecolorRequest, Targets, set_blend_mode,
    },
    transform::{
        self, BatchOutcome, Provenance, UsedNames, VariantRequest, randomize_emitters,
        randomize_systems,
    },
};

use crate::{assets::AssetCopier, error_adapter::render};

/// Run the Quartz CLI application
///
/// # Errors
///
/// Returns `QuartzError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Strict parsing failures
/// - Rejected operations
pub fn run(args: &Args) -> Result<(), QuartzError> {
    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::List(input) => {
            let doc = read_document(&input.input, &app_config, args.strict)?;
            print!("{}", report::listing(doc.index()));
        }
        Command::Unregistered(input) => {
            let doc = read_document(&input.input, &app_config, args.strict)?;
            print!("{}", report::unregistered(doc.index()));
        }
        Command::Randomize(cmd) => randomize(cmd, &app_config, args.strict)?,
        Command::Split(cmd) => {
            let doc = read_document(&cmd.document.input, &app_config, args.strict)?;
            let outcome = transform::split_emitters(
                &doc,
                &cmd.systems,
                app_config.variants(),
                &mut UsedNames::new(),
            )
            .map_err(|err| QuartzError::new_transform_error(err, doc.to_text()))?;
            info!(wrappers = outcome.wrappers.len(); "Emitters split");
            write_document(&cmd.document, &outcome.document)?;
        }
        Command::Recolor(cmd) => recolor_document(cmd, &app_config, args.strict)?,
        Command::BlendMode(cmd) => blend_mode(cmd, &app_config, args.strict)?,
    }
    Ok(())
}

fn read_document(path: &str, config: &AppConfig, strict: bool) -> Result<Document, QuartzError> {
    info!(input_path = path; "Reading document");
    let source = fs::read_to_string(path)?;
    if strict {
        return Document::parse_strict(&source, config.index_config());
    }
    let doc = Document::parse(&source, config.index_config());
    for diag in doc.diagnostics() {
        warn!("{}", render(diag, &source));
    }
    Ok(doc)
}

fn write_document(args: &EditArgs, doc: &Document) -> Result<(), QuartzError> {
    let path = args.output_path();
    fs::write(path, doc.to_text())?;
    info!(output_path = path; "Document written");
    Ok(())
}

fn randomize(cmd: &RandomizeArgs, config: &AppConfig, strict: bool) -> Result<(), QuartzError> {
    let doc = read_document(&cmd.document.input, config, strict)?;
    let source = doc.to_text();
    let request = VariantRequest::new(cmd.suffixes.iter().cloned())
        .with_asset_isolation(cmd.isolate_assets);
    request
        .validate()
        .map_err(|err| QuartzError::new_transform_error(err, source.as_str()))?;

    let mut used = UsedNames::new();
    let outcome: BatchOutcome = if cmd.emitters.is_empty() {
        randomize_systems(doc, &cmd.systems, &request, config.variants(), &mut used)
    } else {
        let targets: Vec<(String, String)> = cmd
            .systems
            .iter()
            .flat_map(|system| {
                cmd.emitters
                    .iter()
                    .map(move |emitter| (system.clone(), emitter.clone()))
            })
            .collect();
        randomize_emitters(doc, &targets, &request, config.variants(), &mut used)
    };

    info!(report = outcome.report.to_string(); "Randomize finished");
    if outcome.report.succeeded == 0 && !outcome.report.failed.is_empty() {
        let diagnostics = outcome.report.failed.into_iter().map(|(_, err)| err).collect();
        return Err(QuartzError::Transform {
            err: DiagnosticError::new(diagnostics),
            src: source,
        });
    }
    for (item, err) in &outcome.report.failed {
        warn!(item = item.as_str(); "{}", render(err, &source));
    }

    write_document(&cmd.document, &outcome.document)?;
    write_provenance(cmd, config, &outcome.provenance)
}

fn write_provenance(
    cmd: &RandomizeArgs,
    config: &AppConfig,
    provenance: &Provenance,
) -> Result<(), QuartzError> {
    if provenance.is_empty() {
        return Ok(());
    }
    if let Some(path) = &cmd.provenance {
        let text = toml::to_string_pretty(provenance)
            .map_err(|err| QuartzError::Config(format!("Cannot serialize provenance: {err}")))?;
        fs::write(path, text)?;
        info!(path = path.as_str(), assets = provenance.len(); "Provenance written");
    }
    if let Some(project_root) = &cmd.copy_assets {
        let source_dir = Path::new(&cmd.document.input)
            .parent()
            .unwrap_or_else(|| Path::new("."));
        let copier = AssetCopier::new(project_root, source_dir, config.index().asset_root());
        let report = copier.copy(provenance);
        for gap in &report.gaps {
            warn!("{}", render(gap, ""));
        }
    }
    Ok(())
}

fn recolor_document(
    cmd: &RecolorArgs,
    config: &AppConfig,
    strict: bool,
) -> Result<(), QuartzError> {
    let mut doc = read_document(&cmd.document.input, config, strict)?;
    let request = recolor_request(cmd, config)?;
    let mut rng = match cmd.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let source = doc.to_text();
    let result = if cmd.materials {
        recolor::recolor_materials(&mut doc, &request, &cmd.material_keys, &cmd.params, &mut rng)
    } else {
        recolor::recolor(&mut doc, &request, &mut rng)
    };
    let report = result.map_err(|err| QuartzError::new_transform_error(err, source))?;
    info!(properties = report.properties, values = report.values; "Recolor finished");
    write_document(&cmd.document, &doc)
}

fn recolor_request(cmd: &RecolorArgs, config: &AppConfig) -> Result<RecolorRequest, QuartzError> {
    let mode = match cmd.mode {
        ModeArg::Random => RecolorMode::Random,
        ModeArg::Linear => RecolorMode::Linear,
        ModeArg::Shift => RecolorMode::Shift {
            hue: cmd.hue,
            saturation: cmd.saturation,
            lightness: cmd.lightness,
        },
        ModeArg::ShiftHue => RecolorMode::ShiftHue(cmd.hue),
    };

    let mut request = RecolorRequest::new(mode)
        .ignoring_black_white(cmd.ignore_black_white || config.recolor().ignore_black_white())
        .with_targets(Targets {
            systems: cmd.systems.clone(),
            emitter_names: cmd.emitters.clone(),
        });
    if !cmd.fields.is_empty() {
        request = request.with_fields(cmd.fields.clone());
    }

    let palette = match &cmd.palette {
        Some(name) => Some(
            config
                .recolor()
                .palette(name)
                .map_err(QuartzError::Config)?
                .ok_or_else(|| QuartzError::Config(format!("Unknown palette `{name}`")))?,
        ),
        None if !cmd.colors.is_empty() => {
            Some(Palette::parse(&cmd.colors).map_err(QuartzError::Config)?)
        }
        None => None,
    };
    if let Some(palette) = palette {
        request = request.with_palette(palette);
    }

    if !cmd.filter.is_empty() {
        let targets = cmd
            .filter
            .iter()
            .map(|spec| Color::new(spec))
            .collect::<Result<Vec<_>, _>>()
            .map_err(QuartzError::Config)?;
        request = request.with_filter(ColorFilter::new(targets, cmd.tolerance));
    }
    Ok(request)
}

fn blend_mode(cmd: &BlendModeArgs, config: &AppConfig, strict: bool) -> Result<(), QuartzError> {
    let mut doc = read_document(&cmd.document.input, config, strict)?;
    let source = doc.to_text();
    let index = doc.index();
    if index.system(&cmd.system).is_none() {
        let err = Diagnostic::error(format!("unknown system `{}`", cmd.system))
            .with_code(ErrorCode::E200);
        return Err(QuartzError::new_transform_error(err, source));
    }

    let keys: Vec<String> = if cmd.emitters.is_empty() {
        index
            .emitters_of(&cmd.system)
            .filter(|emitter| emitter.blend_mode().is_some())
            .map(|emitter| emitter.key().to_string())
            .collect()
    } else {
        cmd.emitters
            .iter()
            .map(|name| {
                index
                    .find_emitter(&cmd.system, name)
                    .map(|emitter| emitter.key().to_string())
                    .ok_or_else(|| {
                        Diagnostic::error(format!("unknown emitter `{name}` in `{}`", cmd.system))
                            .with_code(ErrorCode::E201)
                    })
            })
            .collect::<Result<_, _>>()
            .map_err(|err| QuartzError::new_transform_error(err, source.as_str()))?
    };

    for key in &keys {
        set_blend_mode(&mut doc, key, cmd.value)
            .map_err(|err| QuartzError::new_transform_error(err, source.as_str()))?;
    }
    info!(emitters = keys.len(), value = cmd.value; "Blend modes updated");
    write_document(&cmd.document, &doc)
}
