use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;

use quartz_parser::{IndexConfig, lexer};

/// One asset moved into a variant folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvenanceEntry {
    pub original_path: String,
    pub filename: String,
}

/// Destination folder to the assets that must be copied into it.
///
/// Serializes as a table of folders, each a list of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Provenance {
    folders: BTreeMap<String, Vec<ProvenanceEntry>>,
}

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entry` under `folder` unless the folder already holds a file
    /// of that name. Returns `false` when it was skipped.
    pub fn record(&mut self, folder: &str, entry: ProvenanceEntry) -> bool {
        let entries = self.folders.entry(folder.to_string()).or_default();
        match entries
            .iter()
            .find(|known| known.filename.eq_ignore_ascii_case(&entry.filename))
        {
            Some(known) => {
                if !known.original_path.eq_ignore_ascii_case(&entry.original_path) {
                    warn!(
                        folder,
                        filename = entry.filename.as_str(),
                        kept = known.original_path.as_str(),
                        dropped = entry.original_path.as_str();
                        "Two assets flatten to the same file name"
                    );
                }
                false
            }
            None => {
                entries.push(entry);
                true
            }
        }
    }

    pub fn folder(&self, name: &str) -> &[ProvenanceEntry] {
        self.folders.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn folders(&self) -> impl Iterator<Item = (&str, &[ProvenanceEntry])> {
        self.folders
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.folders.values().all(Vec::is_empty)
    }

    /// Total number of entries over all folders.
    pub fn len(&self) -> usize {
        self.folders.values().map(Vec::len).sum()
    }

    pub fn merge(&mut self, other: Provenance) {
        for (folder, entries) in other.folders {
            for entry in entries {
                self.record(&folder, entry);
            }
        }
    }
}

fn filename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Rewrite every asset path in `lines` to `<root>/<folder>/<filename>`.
///
/// Each distinct path is recorded under `folder` and `backup_folder`.
/// Paths are matched as whole quoted literals, longest first, in one pass
/// per line, so a path never matches inside another or inside text that
/// was already rewritten. Returns the number of distinct paths rewritten.
pub fn isolate_assets(
    lines: &mut [String],
    config: &IndexConfig,
    folder: &str,
    backup_folder: &str,
    provenance: &mut Provenance,
) -> usize {
    let mut table: Vec<(String, String)> = Vec::new();
    for line in lines.iter() {
        for literal in lexer::string_literals(line) {
            if !config.is_asset_path(literal) || table.iter().any(|(from, _)| from == literal) {
                continue;
            }
            let root = &literal[..config.asset_root().len()];
            let name = filename(literal);
            let target = format!("{root}/{folder}/{name}");

            let entry = ProvenanceEntry {
                original_path: literal.to_string(),
                filename: name.to_string(),
            };
            provenance.record(folder, entry.clone());
            provenance.record(backup_folder, entry);
            table.push((literal.to_string(), target));
        }
    }
    if table.is_empty() {
        return 0;
    }

    let mut quoted: Vec<(String, String)> = table
        .iter()
        .map(|(from, to)| (format!("\"{from}\""), format!("\"{to}\"")))
        .collect();
    quoted.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    for line in lines.iter_mut() {
        if line.contains('"') {
            *line = replace_longest_first(line, &quoted);
        }
    }
    debug!(folder, assets = table.len(); "Assets isolated");
    table.len()
}

/// Single left-to-right pass; at each position the longest matching
/// pattern wins and the scan resumes after its replacement.
fn replace_longest_first(line: &str, table: &[(String, String)]) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(ch) = rest.chars().next() {
        if let Some((from, to)) = table.iter().find(|(from, _)| rest.starts_with(from.as_str())) {
            out.push_str(to);
            rest = &rest[from.len()..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}
