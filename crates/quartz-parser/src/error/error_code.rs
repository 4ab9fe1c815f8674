//! Error codes for the Quartz diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Delimiter scanning (malformed input)
//! - `E1xx` - Indexing
//! - `E2xx` - Lookup (a key, block or property was not found)
//! - `E3xx` - Structural and color transformation
//! - `E4xx` - Asset provenance

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Scanning Errors (E0xx)
    // =========================================================================
    /// Unclosed block.
    ///
    /// The input ended before the delimiter that opened a block was closed.
    E001,

    /// Unexpected closing delimiter.
    ///
    /// A `}` appeared with no open block to close.
    E002,

    /// Missing opening delimiter.
    ///
    /// A block scan was requested at a line that holds no `{`.
    E003,

    // =========================================================================
    // Indexing Errors (E1xx)
    // =========================================================================
    /// Malformed value literal.
    ///
    /// A vector or number could not be read where a color value was expected.
    E100,

    /// Mismatched gradient.
    ///
    /// The `times` and `values` lists of a color property differ in length.
    E101,

    // =========================================================================
    // Lookup Errors (E2xx)
    // =========================================================================
    /// Unknown system.
    E200,

    /// Unknown emitter.
    ///
    /// No named emitter matches the selection. Unnamed emitters are never
    /// selectable by name.
    E201,

    /// Missing resource map.
    E202,

    /// Missing emitter list.
    ///
    /// The system has no `complexEmitterDefinitionData` block.
    E203,

    /// Missing blend mode.
    E204,

    /// Randomizer without resolvable children.
    ///
    /// None of the randomizer's children exist as systems in the document.
    E205,

    /// Unknown material.
    E206,

    // =========================================================================
    // Transformation Errors (E3xx)
    // =========================================================================
    /// Invalid variant request.
    ///
    /// The suffix list is empty or a suffix is not usable inside a key.
    E300,

    /// Conflicting edits.
    ///
    /// Two edits of a single operation touch the same lines.
    E301,

    /// Empty palette.
    E302,

    /// Stale coordinate.
    ///
    /// A stored coordinate no longer addresses a value in the line store.
    E303,

    // =========================================================================
    // Provenance Errors (E4xx)
    // =========================================================================
    /// Unresolved asset.
    ///
    /// An original asset path was not found under any candidate root.
    E400,

    /// Asset copy failed.
    E401,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Scanning errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            // Indexing errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            // Lookup errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            // Transformation errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            // Provenance errors
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unclosed block",
            ErrorCode::E002 => "unexpected closing delimiter",
            ErrorCode::E003 => "missing opening delimiter",
            ErrorCode::E100 => "malformed value literal",
            ErrorCode::E101 => "mismatched gradient",
            ErrorCode::E200 => "unknown system",
            ErrorCode::E201 => "unknown emitter",
            ErrorCode::E202 => "missing resource map",
            ErrorCode::E203 => "missing emitter list",
            ErrorCode::E204 => "missing blend mode",
            ErrorCode::E205 => "randomizer without resolvable children",
            ErrorCode::E206 => "unknown material",
            ErrorCode::E300 => "invalid variant request",
            ErrorCode::E301 => "conflicting edits",
            ErrorCode::E302 => "empty palette",
            ErrorCode::E303 => "stale coordinate",
            ErrorCode::E400 => "unresolved asset",
            ErrorCode::E401 => "asset copy failed",
        }
    }

    /// Returns `true` for lookup failures, which batches skip over.
    pub fn is_not_found(&self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E205.to_string(), "E205");
        assert_eq!(ErrorCode::E400.to_string(), "E400");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unclosed block");
        assert_eq!(ErrorCode::E202.description(), "missing resource map");
        assert_eq!(ErrorCode::E400.description(), "unresolved asset");
    }

    #[test]
    fn test_not_found_family() {
        assert!(ErrorCode::E200.is_not_found());
        assert!(ErrorCode::E206.is_not_found());
        assert!(!ErrorCode::E300.is_not_found());
        assert!(!ErrorCode::E001.is_not_found());
    }
}
