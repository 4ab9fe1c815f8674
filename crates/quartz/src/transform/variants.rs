use log::{debug, info, warn};

use quartz_core::lines::{LineRange, LineStore, indent_of};
use quartz_parser::{
    VfxEmitter, VfxSystem,
    error::{Diagnostic, ErrorCode},
};

use super::{
    BatchOutcome, BatchReport, RANDOMIZED_SUFFIX, VariantOutcome, VariantRequest,
    edit::EditPlan,
    isolate::{Provenance, isolate_assets},
    map::plan_map_entries,
    names::{UsedNames, unique_base},
    template::{randomizer_lines, reindent, terminated, wrapper_system_lines},
};
use crate::{Document, config::VariantsConfig};

/// Split one emitter into one system per suffix and put a randomizer in
/// its place.
///
/// Each generated system `<base>_<suffix>` holds a copy of the emitter and
/// is inserted right after the owning system; the emitter itself becomes
/// `<name>_randomized`, choosing uniformly among the generated systems.
/// When the emitter already is a randomizer, the new systems copy the
/// emitter of its first existing child and are added to its children.
///
/// # Errors
///
/// Lookup failures (`E200`, `E201`, `E202`, `E205`) and invalid requests
/// (`E300`). Nothing is changed on error.
pub fn randomize_emitter(
    doc: &Document,
    system_key: &str,
    emitter_name: &str,
    request: &VariantRequest,
    config: &VariantsConfig,
    used: &mut UsedNames,
) -> Result<VariantOutcome, Diagnostic> {
    request.validate()?;
    let index = doc.index();
    let system = find_system(doc, system_key)?;
    let Some(emitter) = index.find_emitter(system_key, emitter_name) else {
        return Err(Diagnostic::error(format!(
            "system `{system_key}` has no emitter named `{emitter_name}`"
        ))
        .with_code(ErrorCode::E201)
        .with_help("only named emitters can be selected"));
    };
    info!(
        system = system_key,
        emitter = emitter_name,
        variants = request.suffixes().len();
        "Randomizing emitter"
    );

    let (template, existing_children) = if emitter.is_randomizer() {
        (child_template(doc, emitter)?, emitter.children())
    } else {
        (emitter_lines(doc, emitter)?, &[][..])
    };

    let unit = config.indent_unit();
    let suffix = doc.lines().line_suffix();
    let base = unique_base(index, system.key(), request.suffixes(), used);
    let mut provenance = Provenance::new();
    let mut created = Vec::with_capacity(request.suffixes().len());
    let mut variants = Vec::new();
    let system_indent = indent_of(doc.lines().line(system.range().start()).unwrap_or_default());
    let emitter_indent = format!("{system_indent}{}", unit.repeat(2));
    for variant in request.suffixes() {
        let key = format!("{base}_{variant}");
        let mut copy = reindent(&template, &emitter_indent);
        if request.isolates_assets() {
            isolate_assets(
                &mut copy,
                doc.config(),
                variant,
                config.backup_folder(),
                &mut provenance,
            );
        }
        variants.extend(wrapper_system_lines(&key, &copy, system_indent, &unit));
        created.push(key);
    }

    let randomizer = randomizer_name(emitter_name);
    let children = union_children(existing_children, &created);
    let header = doc.lines().line(emitter.range().start()).unwrap_or_default();
    let randomizer_block = randomizer_lines(&randomizer, &children, indent_of(header), &unit);

    let mut plan = EditPlan::new();
    plan.replace(emitter.range(), terminated(randomizer_block, suffix));
    plan.insert(system.range().end(), terminated(variants, suffix));
    plan_map_entries(&mut plan, doc, &created, &unit)?;

    let document = finish(doc, plan, &created, used)?;
    debug!(randomizer = randomizer.as_str(), children = children.len(); "Emitter randomized");
    Ok(VariantOutcome {
        document,
        provenance,
        created,
        randomizer,
    })
}

/// Clone a whole system once per suffix and replace its emitters with one
/// randomizer over the clones.
///
/// Clones rename the system key and every quoted reference to it. When the
/// system already holds a single randomizer, clones are made from its first
/// existing child and appended to its children.
///
/// # Errors
///
/// Lookup failures (`E200`, `E202`, `E203`, `E205`) and invalid requests
/// (`E300`). Nothing is changed on error.
pub fn randomize_system(
    doc: &Document,
    system_key: &str,
    request: &VariantRequest,
    config: &VariantsConfig,
    used: &mut UsedNames,
) -> Result<VariantOutcome, Diagnostic> {
    request.validate()?;
    let index = doc.index();
    let system = find_system(doc, system_key)?;
    let Some((first_list, other_lists)) = system
        .emitter_lists()
        .split_first()
        .filter(|(first, _)| first.len() > 1)
    else {
        return Err(Diagnostic::error(format!("system `{system_key}` has no emitter list"))
            .with_code(ErrorCode::E203)
            .with_help("expected a multi-line `complexEmitterDefinitionData` block"));
    };
    info!(system = system_key, variants = request.suffixes().len(); "Randomizing system");

    let existing = existing_randomizer(doc, system);
    let (source, existing_children, randomizer) = match existing {
        Some(randomizer) => (
            first_child_system(doc, randomizer)?,
            randomizer.children().to_vec(),
            randomizer.display_name().to_string(),
        ),
        None => (
            system,
            Vec::new(),
            format!("{}{RANDOMIZED_SUFFIX}", system.display_name()),
        ),
    };
    let source_lines = doc.lines().slice(source.range()).map_err(stale)?;

    let unit = config.indent_unit();
    let suffix = doc.lines().line_suffix();
    let base = unique_base(index, system.key(), request.suffixes(), used);
    let mut provenance = Provenance::new();
    let mut created = Vec::with_capacity(request.suffixes().len());
    let mut clones = Vec::new();
    for variant in request.suffixes() {
        let key = format!("{base}_{variant}");
        let mut copy = rename_references(source_lines, source.key(), &key);
        if request.isolates_assets() {
            isolate_assets(
                &mut copy,
                doc.config(),
                variant,
                config.backup_folder(),
                &mut provenance,
            );
        }
        clones.extend(copy);
        created.push(key);
    }

    let children = union_children(&existing_children, &created);
    let list_header = doc.lines().line(first_list.start()).unwrap_or_default();
    let indent = format!("{}{unit}", indent_of(list_header));
    let randomizer_block = randomizer_lines(&randomizer, &children, &indent, &unit);

    let mut plan = EditPlan::new();
    plan.replace(list_body(*first_list), terminated(randomizer_block, suffix));
    for list in other_lists.iter().filter(|list| list.len() > 1) {
        plan.replace(list_body(*list), Vec::new());
    }
    plan.insert(system.range().end(), terminated(clones, suffix));
    plan_map_entries(&mut plan, doc, &created, &unit)?;

    let document = finish(doc, plan, &created, used)?;
    debug!(randomizer = randomizer.as_str(), children = children.len(); "System randomized");
    Ok(VariantOutcome {
        document,
        provenance,
        created,
        randomizer,
    })
}

/// Randomize several `(system, emitter)` pairs in order.
///
/// Each item works on the result of the previous one. Failed items are
/// logged, reported and skipped.
pub fn randomize_emitters(
    doc: Document,
    targets: &[(String, String)],
    request: &VariantRequest,
    config: &VariantsConfig,
    used: &mut UsedNames,
) -> BatchOutcome {
    run_batch(doc, targets, used, |doc, (system, emitter), used| {
        (
            format!("{system}:{emitter}"),
            randomize_emitter(doc, system, emitter, request, config, used),
        )
    })
}

/// Randomize several systems in order, skipping failed items.
pub fn randomize_systems(
    doc: Document,
    systems: &[String],
    request: &VariantRequest,
    config: &VariantsConfig,
    used: &mut UsedNames,
) -> BatchOutcome {
    run_batch(doc, systems, used, |doc, system, used| {
        (system.clone(), randomize_system(doc, system, request, config, used))
    })
}

fn run_batch<T>(
    doc: Document,
    items: &[T],
    used: &mut UsedNames,
    mut step: impl FnMut(
        &Document,
        &T,
        &mut UsedNames,
    ) -> (String, Result<VariantOutcome, Diagnostic>),
) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        document: doc,
        provenance: Provenance::new(),
        created: Vec::new(),
        report: BatchReport::default(),
    };
    for item in items {
        let (label, result) = step(&outcome.document, item, used);
        match result {
            Ok(done) => {
                outcome.document = done.document;
                outcome.provenance.merge(done.provenance);
                outcome.created.extend(done.created);
                outcome.report.succeeded += 1;
            }
            Err(err) => {
                warn!(item = label.as_str(), err:err; "Batch item skipped");
                outcome.report.failed.push((label, err));
            }
        }
    }
    info!(
        succeeded = outcome.report.succeeded,
        failed = outcome.report.failed.len();
        "Batch finished"
    );
    outcome
}

fn find_system<'a>(doc: &'a Document, key: &str) -> Result<&'a VfxSystem, Diagnostic> {
    doc.index().system(key).ok_or_else(|| {
        Diagnostic::error(format!("unknown system `{key}`")).with_code(ErrorCode::E200)
    })
}

fn stale(err: quartz_core::lines::LineError) -> Diagnostic {
    Diagnostic::error(err.to_string()).with_code(ErrorCode::E303)
}

fn emitter_lines(doc: &Document, emitter: &VfxEmitter) -> Result<Vec<String>, Diagnostic> {
    doc.lines()
        .slice(emitter.range())
        .map(<[String]>::to_vec)
        .map_err(stale)
}

/// The first system among `randomizer`'s children that exists.
fn first_child_system<'a>(
    doc: &'a Document,
    randomizer: &VfxEmitter,
) -> Result<&'a VfxSystem, Diagnostic> {
    randomizer
        .children()
        .iter()
        .find_map(|child| doc.index().system(child))
        .ok_or_else(|| {
            Diagnostic::error(format!(
                "none of the children of `{}` exist in this document",
                randomizer.display_name()
            ))
            .with_code(ErrorCode::E205)
            .with_help("the randomizer can only be extended from an existing variant")
        })
}

/// Emitter lines of the first resolvable child of `randomizer`.
fn child_template(doc: &Document, randomizer: &VfxEmitter) -> Result<Vec<String>, Diagnostic> {
    let child = first_child_system(doc, randomizer)?;
    let Some(emitter) = doc.index().emitters_of(child.key()).next() else {
        return Err(
            Diagnostic::error(format!("child system `{}` has no emitters", child.key()))
                .with_code(ErrorCode::E205),
        );
    };
    emitter_lines(doc, emitter)
}

/// The system's randomizer, if its only emitter is one.
fn existing_randomizer<'a>(doc: &'a Document, system: &VfxSystem) -> Option<&'a VfxEmitter> {
    let mut emitters = doc.index().emitters_of(system.key());
    match (emitters.next(), emitters.next()) {
        (Some(only), None) if only.is_randomizer() => Some(only),
        _ => None,
    }
}

fn randomizer_name(name: &str) -> String {
    if name.ends_with(RANDOMIZED_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{RANDOMIZED_SUFFIX}")
    }
}

fn union_children(existing: &[String], created: &[String]) -> Vec<String> {
    let mut children = existing.to_vec();
    for key in created {
        if !children.iter().any(|child| child.eq_ignore_ascii_case(key)) {
            children.push(key.clone());
        }
    }
    children
}

/// Lines strictly between a multi-line list's header and closing line.
fn list_body(list: LineRange) -> LineRange {
    LineRange::new(list.start() + 1, list.end().saturating_sub(1))
}

/// Copy `lines`, replacing every quoted `"<from>"` with `"<to>"`.
fn rename_references(lines: &[String], from: &str, to: &str) -> Vec<String> {
    let needle = format!("\"{from}\"");
    let replacement = format!("\"{to}\"");
    lines
        .iter()
        .map(|line| line.replace(&needle, &replacement))
        .collect()
}

fn finish(
    doc: &Document,
    plan: EditPlan,
    created: &[String],
    used: &mut UsedNames,
) -> Result<Document, Diagnostic> {
    debug!(edits = plan.len(); "Applying structural edits");
    let lines: LineStore = plan.apply(doc.lines())?;
    used.extend(created);
    Ok(doc.reindexed(lines))
}
