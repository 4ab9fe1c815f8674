//! Line-anchored lexical predicates for the VFX text format.
//!
//! The indexer never tokenizes a whole document. Instead each line is tested
//! against a small set of recognizers built from winnow combinators: an
//! entry header (`"key" = Type {`), a field declaration
//! (`name: kind = value`), a bare struct opening (`Type {`), vector and number
//! literals, and map entries (`"key" = "value"`). Field and type names are
//! compared case-insensitively by callers.

use winnow::{
    Parser as _,
    ascii::{float, space0},
    combinator::{alt, delimited, opt, preceded, separated, terminated},
    error::ModalResult,
    token::{take_till, take_while},
};

type Input<'a> = &'a str;

/// `"key" = Type {` header of a top-level entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader<'a> {
    pub key: &'a str,
    pub type_name: &'a str,
}

/// `name: kind = value` field declaration.
///
/// `value` is everything after the `=`, trimmed on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl<'a> {
    pub name: &'a str,
    pub kind: &'a str,
    pub value: &'a str,
}

impl FieldDecl<'_> {
    /// Case-insensitive field name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

fn identifier<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

/// Field kinds such as `vec4`, `list[pointer]` or `map[hash,link]`.
fn kind<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '[' | ']' | ',')
    })
    .parse_next(input)
}

fn quoted_literal<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    delimited('"', take_till(0.., '"'), '"').parse_next(input)
}

fn hex_literal<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    ("0x", take_while(1.., |c: char| c.is_ascii_hexdigit()))
        .take()
        .parse_next(input)
}

/// Entry keys and link values: a quoted path or a raw hash.
fn key_token<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    alt((quoted_literal, hex_literal)).parse_next(input)
}

fn equals(input: &mut Input<'_>) -> ModalResult<()> {
    (space0, '=', space0).void().parse_next(input)
}

fn entry_header_parser<'a>(input: &mut Input<'a>) -> ModalResult<EntryHeader<'a>> {
    let key = preceded(space0, key_token).parse_next(input)?;
    equals.parse_next(input)?;
    let type_name = terminated(identifier, (space0, '{', space0)).parse_next(input)?;
    Ok(EntryHeader { key, type_name })
}

fn field_decl_parser<'a>(input: &mut Input<'a>) -> ModalResult<FieldDecl<'a>> {
    let name = preceded(space0, identifier).parse_next(input)?;
    let kind = preceded((space0, ':', space0), kind).parse_next(input)?;
    equals.parse_next(input)?;
    let value = input.trim();
    *input = "";
    Ok(FieldDecl { name, kind, value })
}

fn struct_open_parser<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    terminated(preceded(space0, identifier), (space0, '{')).parse_next(input)
}

fn number_token(input: &mut Input<'_>) -> ModalResult<f32> {
    float.parse_next(input)
}

fn vector_parser(input: &mut Input<'_>) -> ModalResult<Vec<f32>> {
    delimited(
        ('{', space0),
        separated(0.., number_token, (space0, ',', space0)),
        (space0, opt(','), space0, '}'),
    )
    .parse_next(input)
}

fn map_entry_parser<'a>(input: &mut Input<'a>) -> ModalResult<(&'a str, &'a str)> {
    let key = preceded(space0, key_token).parse_next(input)?;
    equals.parse_next(input)?;
    let value = terminated(key_token, space0).parse_next(input)?;
    Ok((key, value))
}

/// Run `parser` over the whole of `text`, ignoring trailing whitespace.
fn complete<'a, O>(
    text: &'a str,
    mut parser: impl FnMut(&mut Input<'a>) -> ModalResult<O>,
) -> Option<O> {
    let mut input = text.trim_end();
    let output = parser(&mut input).ok()?;
    input.is_empty().then_some(output)
}

/// Recognize an entry header line, e.g.
/// `"Characters/Ahri/Q" = VfxSystemDefinitionData {`.
pub fn entry_header(line: &str) -> Option<EntryHeader<'_>> {
    complete(line, entry_header_parser)
}

/// Recognize a field declaration line, e.g. `blendMode: u8 = 1`.
pub fn field_decl(line: &str) -> Option<FieldDecl<'_>> {
    let mut input = line;
    field_decl_parser(&mut input).ok()
}

/// Type name of a `Type {` opening at the start of `text`.
///
/// Anything after the brace is ignored so single-line blocks are accepted.
pub fn struct_open(text: &str) -> Option<&str> {
    let mut input = text;
    struct_open_parser(&mut input).ok()
}

/// Returns `true` when `line` opens a `type_name` struct, either bare
/// (`VfxEmitterDefinitionData {`) or as a field value
/// (`dynamics: pointer = VfxAnimatedColorVariableData {`).
pub fn opens_struct(line: &str, type_name: &str) -> bool {
    let value = field_decl(line).map_or(line, |decl| decl.value);
    struct_open(value).is_some_and(|name| name.eq_ignore_ascii_case(type_name))
}

/// A complete vector literal such as `{ 1, 0.5, 0, 1 }`.
pub fn vector(text: &str) -> Option<Vec<f32>> {
    complete(text.trim_start(), vector_parser)
}

/// A single number literal.
pub fn number(text: &str) -> Option<f32> {
    complete(text.trim_start(), number_token)
}

/// Comma separated numbers without braces, as found on the lines of a
/// multi-line `list[f32]` (`0.5` or `0.5,`).
pub fn number_list(text: &str) -> Option<Vec<f32>> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    trimmed.split(',').map(number).collect()
}

/// The content of a leading quoted literal or a raw hash value.
pub fn quoted(text: &str) -> Option<&str> {
    complete(text.trim_start(), key_token)
}

/// A quoted literal or raw hash at the start of `text`, ignoring whatever
/// follows it (`"x" }` yields `x`).
pub fn leading_key(text: &str) -> Option<&str> {
    let mut input = text.trim_start();
    key_token(&mut input).ok()
}

/// A `"key" = "value"` map entry line.
pub fn map_entry(line: &str) -> Option<(&str, &str)> {
    complete(line, map_entry_parser)
}

/// Every `"..."` literal on a line, in order.
pub fn string_literals(line: &str) -> Vec<&str> {
    let mut literals = Vec::new();
    let mut rest = line;
    while let Some(start) = rest.find('"') {
        let after = &rest[start + 1..];
        let Some(len) = after.find('"') else {
            break;
        };
        literals.push(&after[..len]);
        rest = &after[len + 1..];
    }
    literals
}
