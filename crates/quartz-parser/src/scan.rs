//! Balanced-delimiter scanning.
//!
//! Every block lookup in the workspace goes through [`matching_close`]: given
//! the position of an opening `{`, it walks forward counting `{` as +1 and
//! `}` as -1 and reports where the count returns to zero. The result is a
//! tagged [`Scan`] rather than an error, since a missing match is a
//! recoverable condition for callers.

use std::fmt;

use quartz_core::lines::{LineRange, ScanMode};

/// A character position: line index and byte column within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// The extent of one balanced block, from its opening `{` to its closing `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    open: Position,
    close: Position,
}

impl BlockSpan {
    /// Position of the opening delimiter.
    pub fn open(&self) -> Position {
        self.open
    }

    /// Position of the closing delimiter.
    pub fn close(&self) -> Position {
        self.close
    }

    /// Half-open line range covering the block, header line included.
    pub fn line_range(&self) -> LineRange {
        LineRange::new(self.open.line, self.close.line + 1)
    }

    /// Byte column just past the closing delimiter on its line.
    pub fn end_column(&self) -> usize {
        self.close.column + 1
    }
}

/// Outcome of a block scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// The block closes at the contained span.
    Closed(BlockSpan),
    /// There is no counted `{` at the requested position.
    NoOpening,
    /// Input ended while `depth` blocks were still open.
    Unbalanced { depth: usize },
}

impl Scan {
    /// The span of a closed block, or `None` for every other outcome.
    pub fn closed(self) -> Option<BlockSpan> {
        match self {
            Scan::Closed(span) => Some(span),
            _ => None,
        }
    }
}

/// Iterate over the counted delimiters of a line as `(column, char)`.
///
/// In [`ScanMode::QuoteAware`] braces between `"` characters are skipped;
/// quote state never carries across lines.
fn delimiters(line: &str, mode: ScanMode) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut in_string = false;
    let mut escaped = false;
    line.char_indices().filter_map(move |(idx, ch)| {
        if mode == ScanMode::Naive {
            return matches!(ch, '{' | '}').then_some((idx, ch));
        }
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            return None;
        }
        match ch {
            '"' => {
                in_string = true;
                None
            }
            '{' | '}' => Some((idx, ch)),
            _ => None,
        }
    })
}

/// Count the opening and closing delimiters on one line.
pub fn brace_delta(line: &str, mode: ScanMode) -> (usize, usize) {
    delimiters(line, mode).fold((0, 0), |(opens, closes), (_, ch)| {
        if ch == '{' {
            (opens + 1, closes)
        } else {
            (opens, closes + 1)
        }
    })
}

/// Column of the first counted `{` on a line.
pub fn first_opening(line: &str, mode: ScanMode) -> Option<usize> {
    delimiters(line, mode)
        .find(|(_, ch)| *ch == '{')
        .map(|(idx, _)| idx)
}

/// Find the delimiter that closes the `{` at `open`.
pub fn matching_close<S: AsRef<str>>(lines: &[S], open: Position, mode: ScanMode) -> Scan {
    let Some(first) = lines.get(open.line) else {
        return Scan::NoOpening;
    };
    if !delimiters(first.as_ref(), mode).any(|(idx, ch)| idx == open.column && ch == '{') {
        return Scan::NoOpening;
    }

    let mut depth = 0usize;
    for (line_idx, text) in lines.iter().enumerate().skip(open.line) {
        for (column, ch) in delimiters(text.as_ref(), mode) {
            if line_idx == open.line && column < open.column {
                continue;
            }
            if ch == '{' {
                depth += 1;
                continue;
            }
            depth -= 1;
            if depth == 0 {
                return Scan::Closed(BlockSpan {
                    open,
                    close: Position::new(line_idx, column),
                });
            }
        }
    }
    Scan::Unbalanced { depth }
}

/// Scan the block whose header sits on `header_line`.
///
/// The block opens at the first counted `{` of the header line.
pub fn block_range<S: AsRef<str>>(lines: &[S], header_line: usize, mode: ScanMode) -> Scan {
    let Some(column) = lines
        .get(header_line)
        .and_then(|line| first_opening(line.as_ref(), mode))
    else {
        return Scan::NoOpening;
    };
    matching_close(lines, Position::new(header_line, column), mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(String::from).collect()
    }

    #[test]
    fn test_brace_delta_counts_line() {
        assert_eq!(brace_delta("a = { { 1 }, {", ScanMode::QuoteAware), (3, 1));
        assert_eq!(brace_delta("}", ScanMode::Naive), (0, 1));
    }

    #[test]
    fn test_quote_aware_skips_literals() {
        let line = r#"name: string = "odd { name" value = {"#;
        assert_eq!(brace_delta(line, ScanMode::QuoteAware), (1, 0));
        assert_eq!(brace_delta(line, ScanMode::Naive), (2, 0));
    }

    #[test]
    fn test_quote_aware_handles_escaped_quote() {
        let line = r#"a = "x \" }" {"#;
        assert_eq!(brace_delta(line, ScanMode::QuoteAware), (1, 0));
    }

    #[test]
    fn test_block_range_multi_line() {
        let doc = lines("\"a\" = T {\n    x: vec2 = { 1, 2 }\n    y = U {\n    }\n}\ntrailing");
        let span = block_range(&doc, 0, ScanMode::QuoteAware).closed().unwrap();
        assert_eq!(span.line_range(), LineRange::new(0, 5));
        assert_eq!(span.close(), Position::new(4, 0));
        assert_eq!(span.end_column(), 1);
    }

    #[test]
    fn test_block_range_single_line() {
        let doc = lines("x = { 1, 2 } tail");
        let span = block_range(&doc, 0, ScanMode::Naive).closed().unwrap();
        assert_eq!(span.open(), Position::new(0, 4));
        assert_eq!(span.close(), Position::new(0, 11));
        assert_eq!(span.line_range(), LineRange::new(0, 1));
    }

    #[test]
    fn test_nested_open_position() {
        let doc = lines("a = { b = {\n}\n}");
        let inner = matching_close(&doc, Position::new(0, 10), ScanMode::QuoteAware);
        assert_eq!(inner.closed().unwrap().close(), Position::new(1, 0));
    }

    #[test]
    fn test_no_opening() {
        let doc = lines("no braces\n}");
        assert_eq!(block_range(&doc, 0, ScanMode::QuoteAware), Scan::NoOpening);
        assert_eq!(block_range(&doc, 7, ScanMode::QuoteAware), Scan::NoOpening);
        assert_eq!(
            matching_close(&doc, Position::new(0, 3), ScanMode::QuoteAware),
            Scan::NoOpening
        );
    }

    #[test]
    fn test_brace_inside_literal_is_not_an_opening() {
        let doc = lines(r#"a = "{" }"#);
        assert_eq!(
            matching_close(&doc, Position::new(0, 5), ScanMode::QuoteAware),
            Scan::NoOpening
        );
    }

    #[test]
    fn test_unbalanced_reports_depth() {
        let doc = lines("a = {\n  b = {\n  }");
        assert_eq!(
            block_range(&doc, 0, ScanMode::QuoteAware),
            Scan::Unbalanced { depth: 1 }
        );
    }

    mod properties {
        use proptest::prelude::*;

        use super::super::*;

        /// Build a well-formed document from a token stream:
        /// 0 opens, 1 closes when possible, 2 breaks the line, 3 writes text.
        fn balanced(tokens: &[u8]) -> Vec<String> {
            let mut text = String::from("root = {");
            let mut depth = 0usize;
            for token in tokens {
                match token {
                    0 => {
                        text.push_str(" {");
                        depth += 1;
                    }
                    1 if depth > 0 => {
                        text.push_str(" }");
                        depth -= 1;
                    }
                    2 => text.push('\n'),
                    _ => text.push_str(" v: \"{\""),
                }
            }
            for _ in 0..depth {
                text.push_str("\n}");
            }
            text.push_str("\n}");
            text.split('\n').map(String::from).collect()
        }

        proptest! {
            #[test]
            fn balanced_input_closes_on_last_line(tokens in prop::collection::vec(0u8..4, 0..64)) {
                let doc = balanced(&tokens);
                let span = block_range(&doc, 0, ScanMode::QuoteAware).closed();
                prop_assert!(span.is_some());
                let span = span.unwrap();
                prop_assert_eq!(span.line_range(), LineRange::new(0, doc.len()));
                prop_assert!(!span.line_range().is_empty());

                let (opens, closes) = doc.iter().fold((0, 0), |(o, c), line| {
                    let (lo, lc) = brace_delta(line, ScanMode::QuoteAware);
                    (o + lo, c + lc)
                });
                prop_assert_eq!(opens, closes);
            }
        }
    }
}
