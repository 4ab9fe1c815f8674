use log::{debug, info};

use quartz_core::lines::indent_of;
use quartz_parser::{
    VfxSystem,
    error::{Diagnostic, ErrorCode},
};

use super::{
    edit::EditPlan,
    map::plan_map_entries,
    names::{UsedNames, unique_name},
    template::{reindent, terminated, trigger_lines, wrapper_system_lines},
};
use crate::{Document, config::VariantsConfig};

/// Longest short name used inside generated keys.
const SHORT_NAME_LEN: usize = 25;

/// Result of splitting emitters into their own systems.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub document: Document,
    /// Keys of the wrapper systems, in document order.
    pub wrappers: Vec<String>,
}

/// Move every emitter of the selected systems into its own wrapper system.
///
/// Emitter `i` (1-based) of a system becomes a trigger emitter
/// `Trigger_<i>_<name>` that spawns the wrapper system
/// `REC_<short>_<name>`, which holds the original emitter. Unnamed
/// emitters are called `Emitter_<i>`. Wrappers follow their owning system
/// and are registered in the resource map. An empty selection splits every
/// system.
///
/// # Errors
///
/// `E200` for an unknown system, `E202` when the document has no resource
/// map. Nothing is changed on error.
pub fn split_emitters(
    doc: &Document,
    systems: &[String],
    config: &VariantsConfig,
    used: &mut UsedNames,
) -> Result<SplitOutcome, Diagnostic> {
    let index = doc.index();
    let selected: Vec<&VfxSystem> = if systems.is_empty() {
        index.systems().collect()
    } else {
        systems
            .iter()
            .map(|key| {
                index.system(key).ok_or_else(|| {
                    Diagnostic::error(format!("unknown system `{key}`")).with_code(ErrorCode::E200)
                })
            })
            .collect::<Result<_, _>>()?
    };
    info!(systems = selected.len(); "Splitting emitters");

    let unit = config.indent_unit();
    let suffix = doc.lines().line_suffix();
    let mut plan = EditPlan::new();
    let mut wrappers = Vec::new();
    let mut run_names = used.clone();

    for system in selected {
        let short = split_short_name(system);
        let system_indent = indent_of(doc.lines().line(system.range().start()).unwrap_or_default());
        let emitter_indent = format!("{system_indent}{}", unit.repeat(2));
        let mut blocks = Vec::new();
        for (position, emitter) in index.emitters_of(system.key()).enumerate() {
            let number = position + 1;
            let name = emitter
                .name()
                .map_or_else(|| format!("Emitter_{number}"), str::to_string);
            let wrapper = unique_name(index, &format!("REC_{short}_{name}"), &run_names);
            run_names.insert(&wrapper);

            let original = doc.lines().slice(emitter.range()).map_err(|err| {
                Diagnostic::error(err.to_string()).with_code(ErrorCode::E303)
            })?;
            let header = original.first().map_or("", |line| indent_of(line));
            let trigger =
                trigger_lines(&format!("Trigger_{number}_{name}"), &wrapper, header, &unit);
            plan.replace(emitter.range(), terminated(trigger, suffix));

            let copy = reindent(original, &emitter_indent);
            blocks.extend(wrapper_system_lines(&wrapper, &copy, system_indent, &unit));
            wrappers.push(wrapper);
        }
        plan.insert(system.range().end(), terminated(blocks, suffix));
    }

    if wrappers.is_empty() {
        return Ok(SplitOutcome {
            document: doc.clone(),
            wrappers,
        });
    }
    plan_map_entries(&mut plan, doc, &wrappers, &unit)?;
    let lines = plan.apply(doc.lines())?;
    *used = run_names;
    debug!(wrappers = wrappers.len(); "Emitters split");
    Ok(SplitOutcome {
        document: doc.reindexed(lines),
        wrappers,
    })
}

/// Short system name used in wrapper keys.
///
/// Taken from `particleName`, else `particlePath`, else the first eight
/// characters of the key; reduced to its last path segment, stripped of a
/// `<Champion>_Base_` or `<Champion>_Skin<N>_` prefix and cut to 25
/// characters.
pub fn split_short_name(system: &VfxSystem) -> String {
    let source = system
        .particle_name()
        .or(system.particle_path())
        .map_or_else(|| system.key().chars().take(8).collect(), str::to_string);
    let segment = source.rsplit('/').next().unwrap_or(&source);
    strip_skin_prefix(segment).chars().take(SHORT_NAME_LEN).collect()
}

/// Remove a leading `<letters>_Base_` or `<letters>_Skin<digits>_`.
fn strip_skin_prefix(name: &str) -> &str {
    let letters = name
        .find(|ch: char| !ch.is_ascii_alphabetic())
        .unwrap_or(name.len());
    if letters == 0 {
        return name;
    }
    let Some(rest) = name[letters..].strip_prefix('_') else {
        return name;
    };
    if let Some(tail) = rest.strip_prefix("Base_") {
        return tail;
    }
    if let Some(skin) = rest.strip_prefix("Skin") {
        let digits = skin.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(skin.len());
        if digits > 0
            && let Some(tail) = skin[digits..].strip_prefix('_')
        {
            return tail;
        }
    }
    name
}
