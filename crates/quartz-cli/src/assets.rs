//! Copies isolated assets into their variant folders.
//!
//! A provenance record only names where each asset came from. The copier
//! resolves those original paths on disk and places a copy at
//! `<project root>/<asset root>/<folder>/<filename>`, the location the
//! rewritten document now points at.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use quartz::{Diagnostic, ErrorCode, transform::Provenance};

/// What a copy pass did.
#[derive(Debug, Default)]
pub struct CopyReport {
    pub copied: usize,
    /// One diagnostic per asset that could not be resolved or copied.
    pub gaps: Vec<Diagnostic>,
}

impl CopyReport {
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }
}

/// Resolves provenance entries against a list of candidate roots.
#[derive(Debug, Clone)]
pub struct AssetCopier {
    roots: Vec<PathBuf>,
    project_root: PathBuf,
    asset_root: String,
}

impl AssetCopier {
    /// Candidate roots are the project root, its asset folder and the
    /// directory of the source document, tried in that order.
    pub fn new(project_root: impl Into<PathBuf>, source_dir: &Path, asset_root: &str) -> Self {
        let project_root = project_root.into();
        let mut roots = vec![project_root.clone(), project_root.join(asset_root)];
        if !roots.iter().any(|root| root == source_dir) {
            roots.push(source_dir.to_path_buf());
        }
        Self {
            roots,
            project_root,
            asset_root: asset_root.to_string(),
        }
    }

    /// First existing file for `original`, trying each root with the path
    /// as written, then with its asset prefix matched case-insensitively.
    pub fn resolve(&self, original: &str) -> Option<PathBuf> {
        let relative = original.replace('\\', "/");
        let stripped = strip_prefix_ignore_case(&relative, &self.asset_root);
        let mut candidates = vec![relative.clone()];
        if let Some(rest) = stripped {
            candidates.push(rest.to_string());
            candidates.push(format!("{}/{rest}", self.asset_root));
            candidates.push(format!("{}/{rest}", self.asset_root.to_ascii_lowercase()));
        }

        self.roots
            .iter()
            .flat_map(|root| candidates.iter().map(move |candidate| root.join(candidate)))
            .find(|path| path.is_file())
    }

    /// Copy every entry of `provenance` into place. Missing or failing
    /// assets are reported and skipped.
    pub fn copy(&self, provenance: &Provenance) -> CopyReport {
        let mut report = CopyReport::default();
        for (folder, entries) in provenance.folders() {
            let destination = self.project_root.join(&self.asset_root).join(folder);
            for entry in entries {
                let Some(source) = self.resolve(&entry.original_path) else {
                    warn!(asset = entry.original_path.as_str(); "Asset not found");
                    let message = format!("asset `{}` was not found", entry.original_path);
                    report.gaps.push(
                        Diagnostic::warning(message)
                            .with_code(ErrorCode::E400)
                            .with_help("copy it by hand or pass the project root that contains it"),
                    );
                    continue;
                };
                let target = destination.join(&entry.filename);
                match fs::create_dir_all(&destination).and_then(|_| fs::copy(&source, &target)) {
                    Ok(_) => {
                        debug!(
                            from = source.display().to_string(),
                            to = target.display().to_string();
                            "Asset copied"
                        );
                        report.copied += 1;
                    }
                    Err(err) => {
                        warn!(asset = entry.original_path.as_str(), err:err; "Asset copy failed");
                        report.gaps.push(
                            Diagnostic::warning(format!(
                                "could not copy `{}` to `{}`: {err}",
                                entry.original_path,
                                target.display()
                            ))
                            .with_code(ErrorCode::E401),
                        );
                    }
                }
            }
        }
        info!(copied = report.copied, missing = report.gaps.len(); "Asset copy finished");
        report
    }
}

fn strip_prefix_ignore_case<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let head = path.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    path[prefix.len()..].strip_prefix('/')
}

#[cfg(test)]
mod tests {
    use quartz::transform::ProvenanceEntry;
    use tempfile::tempdir;

    use super::*;

    fn entry(path: &str) -> ProvenanceEntry {
        ProvenanceEntry {
            original_path: path.to_string(),
            filename: path.rsplit('/').next().unwrap().to_string(),
        }
    }

    #[test]
    fn test_copies_with_case_insensitive_prefix() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("assets/x/y");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("tex.dds"), b"dds").unwrap();

        let mut provenance = Provenance::new();
        provenance.record("fire", entry("ASSETS/x/y/tex.dds"));
        provenance.record("_backup", entry("ASSETS/x/y/tex.dds"));

        let copier = AssetCopier::new(dir.path(), dir.path(), "ASSETS");
        let report = copier.copy(&provenance);
        assert!(report.is_complete());
        assert_eq!(report.copied, 2);
        assert_eq!(fs::read(dir.path().join("ASSETS/fire/tex.dds")).unwrap(), b"dds");
        assert!(dir.path().join("ASSETS/_backup/tex.dds").is_file());
    }

    #[test]
    fn test_missing_asset_is_reported() {
        let dir = tempdir().unwrap();
        let mut provenance = Provenance::new();
        provenance.record("fire", entry("ASSETS/nowhere/gone.dds"));

        let report = AssetCopier::new(dir.path(), dir.path(), "ASSETS").copy(&provenance);
        assert_eq!(report.copied, 0);
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].code(), Some(ErrorCode::E400));
    }

    #[test]
    fn test_strip_prefix_ignore_case() {
        assert_eq!(strip_prefix_ignore_case("assets/a/b", "ASSETS"), Some("a/b"));
        assert_eq!(strip_prefix_ignore_case("ASSETSX/a", "ASSETS"), None);
        assert_eq!(strip_prefix_ignore_case("as", "ASSETS"), None);
    }
}
