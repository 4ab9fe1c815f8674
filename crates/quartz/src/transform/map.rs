use log::debug;

use quartz_core::lines::{LineRange, indent_of};
use quartz_parser::error::{Diagnostic, ErrorCode};

use super::{edit::EditPlan, template::terminated};
use crate::{Document, config::VariantsConfig};

/// Append `"<key>" = "<key>"` to the resource map for each key it lacks.
///
/// Entries go right before the map's closing delimiter, indented like the
/// last existing entry, or one level deeper than the map header when the
/// map is empty.
///
/// # Errors
///
/// Returns `E202` if the document has no resource map.
pub fn append_map_entries(
    doc: &Document,
    keys: &[String],
    config: &VariantsConfig,
) -> Result<Document, Diagnostic> {
    let mut plan = EditPlan::new();
    let added = plan_map_entries(&mut plan, doc, keys, &config.indent_unit())?;
    if added == 0 {
        return Ok(doc.clone());
    }
    let lines = plan.apply(doc.lines())?;
    Ok(doc.reindexed(lines))
}

/// Add the map edit for `keys` to `plan`. Returns how many entries it adds.
pub(crate) fn plan_map_entries(
    plan: &mut EditPlan,
    doc: &Document,
    keys: &[String],
    unit: &str,
) -> Result<usize, Diagnostic> {
    let Some(map) = doc.index().resource_map() else {
        return Err(Diagnostic::error("document has no resource map")
            .with_code(ErrorCode::E202)
            .with_help("new systems must be registered in a `resourceMap: map[hash,link]` block"));
    };

    let mut fresh: Vec<&String> = Vec::new();
    for key in keys {
        if !map.contains_key(key) && !fresh.iter().any(|known| known.eq_ignore_ascii_case(key)) {
            fresh.push(key);
        }
    }
    if fresh.is_empty() {
        return Ok(0);
    }

    let lines = doc.lines();
    let header = lines.line(map.range().start()).unwrap_or_default();
    let indent = match map.entry_indent() {
        Some(indent) => indent.to_string(),
        None => format!("{}{unit}", indent_of(header)),
    };
    let entries: Vec<String> = fresh
        .iter()
        .map(|key| format!("{indent}\"{key}\" = \"{key}\""))
        .collect();
    let suffix = lines.line_suffix();

    if map.range().len() > 1 {
        plan.insert(map.close_line(), terminated(entries, suffix));
    } else {
        // `resourceMap: map[hash,link] = {}` on one line: open it up.
        let body = header.trim_end_matches('\r');
        let close = body.rfind('}').unwrap_or(body.len());
        let mut expanded = vec![body[..close].trim_end().to_string()];
        expanded.extend(entries);
        expanded.push(format!("{}{}", indent_of(header), &body[close..]));
        plan.replace(
            LineRange::new(map.range().start(), map.range().end()),
            terminated(expanded, suffix),
        );
    }

    debug!(entries = fresh.len(); "Resource map entries planned");
    Ok(fresh.len())
}
