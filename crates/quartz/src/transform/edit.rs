use quartz_core::lines::{LineRange, LineStore};
use quartz_parser::error::{Diagnostic, ErrorCode};

#[derive(Debug, Clone)]
enum Edit {
    /// Insert lines before `at`.
    Insert { at: usize, lines: Vec<String> },
    /// Replace the lines of `range`.
    Replace { range: LineRange, lines: Vec<String> },
}

impl Edit {
    fn start(&self) -> usize {
        match self {
            Edit::Insert { at, .. } => *at,
            Edit::Replace { range, .. } => range.start(),
        }
    }

    fn end(&self) -> usize {
        match self {
            Edit::Insert { at, .. } => *at,
            Edit::Replace { range, .. } => range.end(),
        }
    }

    /// Inserts sort before replacements starting at the same line.
    fn rank(&self) -> u8 {
        match self {
            Edit::Insert { .. } => 0,
            Edit::Replace { .. } => 1,
        }
    }
}

/// Line edits of one structural operation, all expressed against the
/// original line numbers.
///
/// Inserts at the same line keep the order they were added in and land
/// before a replacement starting at that line.
#[derive(Debug, Clone, Default)]
pub(crate) struct EditPlan {
    edits: Vec<Edit>,
}

impl EditPlan {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, at: usize, lines: Vec<String>) {
        if !lines.is_empty() {
            self.edits.push(Edit::Insert { at, lines });
        }
    }

    pub(crate) fn replace(&mut self, range: LineRange, lines: Vec<String>) {
        self.edits.push(Edit::Replace { range, lines });
    }

    pub(crate) fn len(&self) -> usize {
        self.edits.len()
    }

    /// Apply every edit to a copy of `store`.
    ///
    /// Fails without touching anything when an edit falls outside the store
    /// or two edits overlap.
    pub(crate) fn apply(mut self, store: &LineStore) -> Result<LineStore, Diagnostic> {
        self.edits.sort_by_key(|edit| (edit.start(), edit.rank()));
        self.check(store.len())?;

        let original = store.lines();
        let mut out = Vec::with_capacity(original.len());
        let mut cursor = 0;
        for edit in self.edits {
            match edit {
                Edit::Insert { at, lines } => {
                    out.extend_from_slice(&original[cursor..at]);
                    cursor = at;
                    out.extend(lines);
                }
                Edit::Replace { range, lines } => {
                    out.extend_from_slice(&original[cursor..range.start()]);
                    out.extend(lines);
                    cursor = range.end();
                }
            }
        }
        out.extend_from_slice(&original[cursor..]);
        Ok(LineStore::from_lines(out))
    }

    fn check(&self, len: usize) -> Result<(), Diagnostic> {
        if let Some(edit) = self.edits.iter().find(|edit| edit.end() > len) {
            return Err(Diagnostic::error(format!(
                "edit at lines {}..{} is outside the document ({len} lines)",
                edit.start(),
                edit.end()
            ))
            .with_code(ErrorCode::E303)
            .with_help("re-index the document before editing"));
        }

        let mut covered = 0;
        for edit in &self.edits {
            if edit.start() < covered {
                return Err(Diagnostic::error(format!(
                    "edits overlap at line {}",
                    edit.start()
                ))
                .with_code(ErrorCode::E301));
            }
            covered = covered.max(edit.end());
        }
        Ok(())
    }
}
