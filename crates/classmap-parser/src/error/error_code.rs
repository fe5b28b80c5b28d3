//! Error codes for the classmap diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E3xx` - Extraction errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A regular, verbatim or interpolated string was opened but never closed.
    E001,

    /// Unexpected character.
    ///
    /// A control character or other byte that cannot start any token.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are `\'`, `\"`, `\\`, `\0`, `\a`, `\b`, `\f`, `\n`,
    /// `\r`, `\t`, `\v`, `\xH..HHHH`, `\uHHHH` and `\UHHHHHHHH`.
    E003,

    /// Unterminated block comment.
    ///
    /// A `/*` comment runs to the end of the input.
    E004,

    /// Unterminated character literal.
    ///
    /// A `'` literal was opened but never closed.
    E005,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended unexpectedly before a complete construct was parsed.
    E101,

    /// Expected a type declaration.
    ///
    /// A namespace body contains something other than a class or an enum.
    E102,

    // =========================================================================
    // Extraction Errors (E3xx)
    // =========================================================================
    /// Missing required node.
    ///
    /// A matched production lacks a node the grammar guarantees. This is an
    /// internal error, not a problem with the input.
    E300,

    /// Unsupported default value.
    ///
    /// A parameter default is neither a signed integer nor a string literal
    /// and the extraction policy rejects such defaults.
    E301,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            // Extraction errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "unterminated block comment",
            ErrorCode::E005 => "unterminated character literal",
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "expected type declaration",
            // Extraction errors
            ErrorCode::E300 => "missing required node",
            ErrorCode::E301 => "unsupported default value",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
