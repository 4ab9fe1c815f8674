use std::collections::HashSet;

use log::debug;

use quartz_parser::ParsedDocument;

/// Keys handed out during a run, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct UsedNames {
    names: HashSet<String>,
}

impl UsedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    /// Returns `false` if `name` was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> Extend<S> for UsedNames {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name.as_ref());
        }
    }
}

fn is_free(index: &ParsedDocument, used: &UsedNames, key: &str) -> bool {
    !index.has_key(key) && !used.contains(key)
}

/// Pick a base such that `<base>_<suffix>` is free for every suffix.
///
/// Tries `base` first, then `base_2`, `base_3`, ... A key is taken when the
/// document already has it or `used` holds it.
pub fn unique_base(
    index: &ParsedDocument,
    base: &str,
    suffixes: &[String],
    used: &UsedNames,
) -> String {
    let fits = |candidate: &str| {
        suffixes
            .iter()
            .all(|suffix| is_free(index, used, &format!("{candidate}_{suffix}")))
    };
    if fits(base) {
        return base.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}_{counter}");
        if fits(&candidate) {
            debug!(base, chosen = candidate.as_str(); "Variant name collision resolved");
            return candidate;
        }
        counter += 1;
    }
}

/// `name` itself if free, otherwise the first free `name_<n>` with n >= 2.
pub fn unique_name(index: &ParsedDocument, name: &str, used: &UsedNames) -> String {
    if is_free(index, used, name) {
        return name.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{name}_{counter}");
        if is_free(index, used, &candidate) {
            debug!(name, chosen = candidate.as_str(); "Name collision resolved");
            return candidate;
        }
        counter += 1;
    }
}
