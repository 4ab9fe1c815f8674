//! Text templates for synthesized blocks.
//!
//! Templates return lines without terminator residue; callers append the
//! document's line suffix.

use quartz_core::lines::indent_of;
use quartz_parser::index::{EMITTER_TYPE, SYSTEM_TYPE};

/// Collects lines indented relative to a base.
struct Writer<'a> {
    base: &'a str,
    unit: &'a str,
    lines: Vec<String>,
}

impl<'a> Writer<'a> {
    fn new(base: &'a str, unit: &'a str) -> Self {
        Self {
            base,
            unit,
            lines: Vec::new(),
        }
    }

    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}{}", self.base, self.unit.repeat(depth), text.as_ref()));
    }

    fn constant_float(&mut self, depth: usize, field: &str, value: &str) {
        self.line(depth, format!("{field}: embed = ValueFloat {{"));
        self.line(depth + 1, format!("constantValue: f32 = {value}"));
        self.line(depth, "}");
    }

    fn children(&mut self, depth: usize, children: &[String]) {
        self.line(
            depth,
            "childParticleSetDefinition: pointer = VfxChildParticleSetDefinitionData {",
        );
        self.line(depth + 1, "childrenIdentifiers: list[embed] = {");
        for child in children {
            self.line(depth + 2, "VfxChildIdentifier {");
            self.line(depth + 3, format!("effect: link = \"{child}\""));
            self.line(depth + 2, "}");
        }
        self.line(depth + 1, "}");
        self.line(depth, "}");
    }

    fn finish(self) -> Vec<String> {
        self.lines
    }
}

/// A randomizer emitter choosing uniformly among `children`.
///
/// `childrenProbability` is a step from 0 at time 0 to N at time 1, which
/// the runtime floors into a child index.
pub fn randomizer_lines(name: &str, children: &[String], indent: &str, unit: &str) -> Vec<String> {
    let mut out = Writer::new(indent, unit);
    out.line(0, format!("{EMITTER_TYPE} {{"));
    out.constant_float(1, "rate", "1");
    out.line(1, "childrenProbability: embed = ValueFloat {");
    out.line(2, "dynamics: pointer = VfxAnimatedFloatVariableData {");
    out.line(3, "times: list[f32] = {");
    out.line(4, "0");
    out.line(4, "1");
    out.line(3, "}");
    out.line(3, "values: list[f32] = {");
    out.line(4, "0");
    out.line(4, children.len().to_string());
    out.line(3, "}");
    out.line(2, "}");
    out.line(1, "}");
    out.children(1, children);
    out.line(1, "isSingleParticle: flag = true");
    out.line(1, format!("emitterName: string = \"{name}\""));
    out.line(0, "}");
    out.finish()
}

/// A single-particle emitter that spawns the system `child`.
pub fn trigger_lines(name: &str, child: &str, indent: &str, unit: &str) -> Vec<String> {
    let mut out = Writer::new(indent, unit);
    out.line(0, format!("{EMITTER_TYPE} {{"));
    out.line(1, "isSingleParticle: flag = true");
    out.children(1, &[child.to_string()]);
    out.constant_float(1, "bindWeight", "1");
    out.line(1, "particleIsLocalOrientation: flag = true");
    out.constant_float(1, "rate", "1");
    out.line(1, format!("emitterName: string = \"{name}\""));
    out.line(0, "}");
    out.finish()
}

/// A system entry named `key` holding the given emitter lines.
///
/// `emitter_lines` must already be indented two levels below `indent`.
pub fn wrapper_system_lines(
    key: &str,
    emitter_lines: &[String],
    indent: &str,
    unit: &str,
) -> Vec<String> {
    let mut out = Writer::new(indent, unit);
    out.line(0, format!("\"{key}\" = {SYSTEM_TYPE} {{"));
    out.line(1, "complexEmitterDefinitionData: list[pointer] = {");
    out.lines.extend_from_slice(emitter_lines);
    out.line(1, "}");
    out.line(1, format!("particleName: string = \"{key}\""));
    out.line(1, format!("particlePath: string = \"{key}\""));
    out.line(0, "}");
    out.finish()
}

/// Move a copied block to a new base indentation.
///
/// The first line's indentation is the block's base; lines that do not
/// share it are re-based from their trimmed text.
pub fn reindent(lines: &[String], indent: &str) -> Vec<String> {
    let Some(first) = lines.first() else {
        return Vec::new();
    };
    let old = indent_of(first);
    lines
        .iter()
        .map(|line| match line.strip_prefix(old) {
            Some(rest) => format!("{indent}{rest}"),
            None => format!("{indent}{}", line.trim_start()),
        })
        .collect()
}

/// Append the document's terminator residue to lines that lack it.
pub(crate) fn terminated(lines: Vec<String>, suffix: &str) -> Vec<String> {
    if suffix.is_empty() {
        return lines;
    }
    lines
        .into_iter()
        .map(|line| if line.ends_with(suffix) { line } else { line + suffix })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quartz_core::lines::LineStore;
    use quartz_parser::{IndexConfig, index_document};

    #[test]
    fn test_randomizer_is_indexed_as_randomizer() {
        let children = vec!["a/b_fire".to_string(), "a/b_ice".to_string()];
        let mut text = vec![
            "\"a/b\" = VfxSystemDefinitionData {".to_string(),
            "    complexEmitterDefinitionData: list[pointer] = {".to_string(),
        ];
        text.extend(randomizer_lines("Spark_randomized", &children, "        ", "    "));
        text.push("    }".to_string());
        text.push("}".to_string());

        let doc = index_document(&LineStore::from_lines(text.clone()), &IndexConfig::default());
        let emitter = doc.find_emitter("a/b", "Spark_randomized").unwrap();
        assert_eq!(emitter.children(), children.as_slice());
        assert!(emitter.is_randomizer());
        assert!(doc.diagnostics().is_empty());
        assert!(text.contains(&"                        2".to_string()));
    }

    #[test]
    fn test_trigger_links_one_child() {
        let lines = trigger_lines("Trigger_1_Spark", "REC_Q_Spark", "", "  ");
        assert_eq!(lines[0], "VfxEmitterDefinitionData {");
        assert!(lines.contains(&"        effect: link = \"REC_Q_Spark\"".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("}"));
    }

    #[test]
    fn test_reindent() {
        let lines = vec![
            "            Vfx {".to_string(),
            "                a: u8 = 1\r".to_string(),
            "  odd: u8 = 2".to_string(),
            "            }".to_string(),
        ];
        assert_eq!(
            reindent(&lines, "        "),
            vec![
                "        Vfx {".to_string(),
                "            a: u8 = 1\r".to_string(),
                "        odd: u8 = 2".to_string(),
                "        }".to_string(),
            ]
        );
    }

    #[test]
    fn test_terminated() {
        let lines = terminated(vec!["a".to_string(), "b\r".to_string()], "\r");
        assert_eq!(lines, vec!["a\r".to_string(), "b\r".to_string()]);
    }
}
