//! The line store and the coordinates that address it.
//!
//! A [`LineStore`] owns the text of a document as an ordered sequence of
//! lines. Every other component refers to content through integer
//! coordinates: a [`LineRange`] for blocks and a [`ValueCoord`] for a single
//! vector literal inside a line. Untouched lines are never re-rendered, so
//! serializing an unmodified store reproduces the input byte for byte.
//!
//! # Example
//!
//! ```
//! use quartz_core::lines::{LineStore, ValueCoord};
//!
//! let mut store = LineStore::from_text("color: vec4 = { 1, 0, 0, 1 }\n");
//! store.write_vector(ValueCoord::new(0, 0), &[0.0, 0.5, 1.0, 1.0]).unwrap();
//! assert_eq!(store.to_text(), "color: vec4 = { 0, 0.5, 1, 1 }\n");
//! ```

use std::{fmt, ops::Range};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a coordinate does not address valid content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("line {line} is out of range (document has {len} lines)")]
    OutOfRange { line: usize, len: usize },

    #[error("range {start}..{end} is out of bounds (document has {len} lines)")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("line {line} has no vector literal at slot {slot}")]
    MissingVector { line: usize, slot: usize },

    #[error("line {line} has no `=` separated value")]
    MissingValue { line: usize },
}

/// A half-open range of line indices `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineRange {
    start: usize,
    end: usize,
}

impl LineRange {
    /// Creates a new range. `end` is clamped so it is never before `start`.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// First line of the range.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last line of the range.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Index of the last line in the range, if any.
    pub fn last(&self) -> Option<usize> {
        (self.end > self.start).then(|| self.end - 1)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `line` falls inside this range.
    pub fn contains(&self, line: usize) -> bool {
        (self.start..self.end).contains(&line)
    }

    /// Returns `true` if `other` lies entirely within this range.
    pub fn encloses(&self, other: LineRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` if the two ranges share at least one line.
    pub fn overlaps(&self, other: LineRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Address of one vector literal: a line index and the ordinal of the
/// innermost `{ ... }` group on that line.
///
/// Most values sit alone on their line (slot 0); single-line list renderings
/// such as `values: list[vec4] = { { 1, 0, 0, 1 }, { 0, 0, 1, 1 } }` place
/// several vectors on one line, one slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueCoord {
    line: usize,
    slot: usize,
}

impl ValueCoord {
    pub fn new(line: usize, slot: usize) -> Self {
        Self { line, slot }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// How delimiters are counted when scanning a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// Braces inside `"..."` literals are ignored.
    #[default]
    QuoteAware,
    /// Every `{` and `}` counts, including those inside string literals.
    Naive,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::QuoteAware => write!(f, "quote-aware"),
            ScanMode::Naive => write!(f, "naive"),
        }
    }
}

/// Ordered, line-indexed text buffer.
///
/// Lines are stored without their `\n` terminator. A trailing `\r` (CRLF
/// input) stays part of the line so it survives untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<String>,
}

impl LineStore {
    /// Splits `text` on `\n`.
    ///
    /// A trailing newline yields a final empty line, which is what makes
    /// [`LineStore::to_text`] an exact inverse.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(String::from).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Borrow the lines covered by `range`.
    pub fn slice(&self, range: LineRange) -> Result<&[String], LineError> {
        self.check_range(range)?;
        Ok(&self.lines[range.start()..range.end()])
    }

    /// Line terminator residue to append to generated lines so they match
    /// the document (`"\r"` for CRLF input, empty otherwise).
    pub fn line_suffix(&self) -> &'static str {
        match self.lines.first() {
            Some(first) if first.ends_with('\r') => "\r",
            _ => "",
        }
    }

    /// Replace one line by index.
    pub fn set_line(&mut self, index: usize, text: impl Into<String>) -> Result<(), LineError> {
        let len = self.lines.len();
        let slot = self
            .lines
            .get_mut(index)
            .ok_or(LineError::OutOfRange { line: index, len })?;
        *slot = text.into();
        Ok(())
    }

    /// Replace the lines in `range` with `replacement`.
    ///
    /// An empty range inserts before `range.start()`.
    pub fn splice(&mut self, range: LineRange, replacement: Vec<String>) -> Result<(), LineError> {
        self.check_range(range)?;
        self.lines.splice(range.start()..range.end(), replacement);
        Ok(())
    }

    /// Byte offset of the start of `line` in the serialized text.
    pub fn offset_of(&self, line: usize) -> usize {
        self.lines
            .iter()
            .take(line)
            .map(|text| text.len() + 1)
            .sum()
    }

    /// Byte span of `line` (without its terminator) in the serialized text.
    pub fn line_span(&self, line: usize) -> Range<usize> {
        let start = self.offset_of(line);
        let len = self.lines.get(line).map_or(0, String::len);
        start..start + len
    }

    /// Rewrite the vector literal at `coord` with `values`.
    ///
    /// Only the `{ ... }` group itself is replaced; indentation, field name
    /// and anything after the group keep their original bytes.
    pub fn write_vector(&mut self, coord: ValueCoord, values: &[f32]) -> Result<(), LineError> {
        let len = self.lines.len();
        let line = self.lines.get_mut(coord.line()).ok_or(LineError::OutOfRange {
            line: coord.line(),
            len,
        })?;
        let span = vector_spans(line)
            .into_iter()
            .nth(coord.slot())
            .ok_or(LineError::MissingVector {
                line: coord.line(),
                slot: coord.slot(),
            })?;
        line.replace_range(span, &format_vector(values));
        Ok(())
    }

    /// Rewrite the scalar after the first `=` on `index`, keeping the
    /// field declaration and any trailing `\r`.
    pub fn write_field_value(&mut self, index: usize, value: &str) -> Result<(), LineError> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(LineError::OutOfRange { line: index, len })?;
        let eq = line
            .find('=')
            .ok_or(LineError::MissingValue { line: index })?;
        let value_start = eq + 1 + (line[eq + 1..].len() - line[eq + 1..].trim_start().len());
        let value_end = line.trim_end().len().max(value_start);
        line.replace_range(value_start..value_end, value);
        Ok(())
    }

    /// Serialize the store back into text.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    fn check_range(&self, range: LineRange) -> Result<(), LineError> {
        if range.end() > self.lines.len() {
            return Err(LineError::InvalidRange {
                start: range.start(),
                end: range.end(),
                len: self.lines.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for LineStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Byte ranges of the innermost `{ ... }` groups on a line, in order.
///
/// A group is innermost when it contains no other brace. Braces inside
/// `"..."` literals are ignored.
pub fn vector_spans(line: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;
    let mut in_string = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '{' if !in_string => open = Some(idx),
            '}' if !in_string => {
                if let Some(start) = open.take() {
                    spans.push(start..idx + 1);
                }
            }
            _ => {}
        }
    }
    spans
}

/// Leading whitespace of a line.
pub fn indent_of(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// Render a number the way the text converter does: integers without a
/// fractional part, everything else with at most six decimals.
pub fn format_number(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (f64::from(value) * 1_000_000.0).round() / 1_000_000.0;
    if rounded == rounded.trunc() {
        return format!("{}", rounded as i64);
    }
    let text = format!("{rounded:.6}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Render a vector literal, e.g. `{ 1, 0.5, 0, 1 }`.
pub fn format_vector(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().copied().map(format_number).collect();
    format!("{{ {} }}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_bytes() {
        let text = "a = 1\r\n    b: vec4 = { 1, 1, 1, 1 }\r\n\r\n";
        let store = LineStore::from_text(text);
        assert_eq!(store.to_text(), text);
        assert_eq!(store.line_suffix(), "\r");
    }

    #[test]
    fn test_empty_text_round_trip() {
        let store = LineStore::from_text("");
        assert_eq!(store.len(), 1);
        assert_eq!(store.to_text(), "");
    }

    #[test]
    fn test_vector_spans_innermost_only() {
        let line = "values: list[vec4] = { { 1, 0, 0, 1 }, { 0, 0, 1, 1 } }";
        let spans = vector_spans(line);
        assert_eq!(spans.len(), 2);
        assert_eq!(&line[spans[0].clone()], "{ 1, 0, 0, 1 }");
        assert_eq!(&line[spans[1].clone()], "{ 0, 0, 1, 1 }");
    }

    #[test]
    fn test_vector_spans_ignore_quoted_braces() {
        let spans = vector_spans(r#"name: string = "{x}" value: vec2 = { 1, 2 }"#);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_write_vector_second_slot() {
        let mut store = LineStore::from_text("  v = { { 1, 1 }, { 2, 2 } }");
        store
            .write_vector(ValueCoord::new(0, 1), &[0.25, 3.0])
            .unwrap();
        assert_eq!(store.to_text(), "  v = { { 1, 1 }, { 0.25, 3 } }");
    }

    #[test]
    fn test_write_vector_missing_slot() {
        let mut store = LineStore::from_text("no vectors here");
        let err = store
            .write_vector(ValueCoord::new(0, 0), &[1.0])
            .unwrap_err();
        assert_eq!(err, LineError::MissingVector { line: 0, slot: 0 });
    }

    #[test]
    fn test_write_field_value_keeps_suffix() {
        let mut store = LineStore::from_text("    blendMode: u8 = 1\r\nnext");
        store.write_field_value(0, "4").unwrap();
        assert_eq!(store.line(0), Some("    blendMode: u8 = 4\r"));
    }

    #[test]
    fn test_splice_insert_and_replace() {
        let mut store = LineStore::from_text("a\nb\nc");
        store
            .splice(LineRange::new(1, 1), vec!["x".to_string()])
            .unwrap();
        assert_eq!(store.to_text(), "a\nx\nb\nc");
        store
            .splice(LineRange::new(2, 4), vec!["y".to_string()])
            .unwrap();
        assert_eq!(store.to_text(), "a\nx\ny");
        assert!(store.splice(LineRange::new(2, 9), Vec::new()).is_err());
    }

    #[test]
    fn test_offsets() {
        let store = LineStore::from_text("ab\ncde\nf");
        assert_eq!(store.offset_of(0), 0);
        assert_eq!(store.offset_of(2), 7);
        assert_eq!(store.line_span(1), 3..6);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.25), "-0.25");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(f32::NAN), "0");
    }

    #[test]
    fn test_line_range_relations() {
        let outer = LineRange::new(2, 10);
        assert!(outer.encloses(LineRange::new(3, 5)));
        assert!(outer.overlaps(LineRange::new(9, 12)));
        assert!(!outer.overlaps(LineRange::new(10, 12)));
        assert_eq!(outer.last(), Some(9));
        assert_eq!(LineRange::new(4, 4).last(), None);
    }

    mod properties {
        use proptest::prelude::*;

        use super::super::LineStore;

        proptest! {
            #[test]
            fn from_text_to_text_is_identity(text in "[a-z{}\" =,\r\n\t0-9.]{0,200}") {
                prop_assert_eq!(LineStore::from_text(&text).to_text(), text);
            }
        }
    }
}
