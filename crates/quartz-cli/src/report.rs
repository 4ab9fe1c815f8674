//! Plain-text summaries printed by `list` and `unregistered`.

use std::fmt::Write;

use quartz::{ParsedDocument, color::Color};
use quartz_parser::ColorProperty;

/// Systems with their emitters and color properties, then materials and
/// the resource map.
pub fn listing(index: &ParsedDocument) -> String {
    let mut out = String::new();
    for system in index.systems() {
        let _ = writeln!(out, "{} ({})", system.key(), system.display_name());
        for emitter in index.emitters_of(system.key()) {
            let _ = write!(out, "  [{}] {}", emitter.ordinal(), emitter.display_name());
            if let Some(blend) = emitter.blend_mode() {
                let _ = write!(out, " blend={}", blend.value());
            }
            if emitter.is_randomizer() {
                let _ = write!(out, " randomizer");
            }
            out.push('\n');
            for property in emitter.colors() {
                let _ = writeln!(out, "    {}: {}", property.field(), describe(property));
            }
            for child in emitter.children() {
                let _ = writeln!(out, "    -> {child}");
            }
        }
    }

    for material in index.materials() {
        let _ = writeln!(out, "material {}", material.key());
        for param in material.params() {
            let _ = writeln!(out, "  {}: {}", param.name(), hex(param.value().color()));
        }
    }

    match index.resource_map() {
        Some(map) => {
            let _ = writeln!(out, "resource map: {} entries", map.entries().len());
        }
        None => out.push_str("resource map: missing\n"),
    }
    out
}

/// One key per line for every system missing from the resource map.
pub fn unregistered(index: &ParsedDocument) -> String {
    index
        .unregistered_systems()
        .iter()
        .map(|system| format!("{}\n", system.key()))
        .collect()
}

fn describe(property: &ColorProperty) -> String {
    if let Some(inline) = property.inline() {
        return hex(inline.color());
    }
    let mut parts = Vec::new();
    if let Some(constant) = property.constant() {
        parts.push(hex(constant.color()));
    }
    if property.is_gradient() {
        let (start, end) = property.time_range();
        parts.push(format!("gradient of {} over {start}..{end}", property.stops().len()));
    }
    parts.join(", ")
}

fn hex(color: Color) -> String {
    color.to_hex()
}
