//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the source unit.
///
/// A diagnostic normally carries one primary label marking the offending
/// token. Secondary labels point at related code, such as the declaration
/// that encloses a malformed member:
///
/// ```text
/// error[E100]: unexpected token: expected `)`
///   --> Inventory.cs:7:31
///    |
///  5 |     public class Inventory
///    |                  --------- in this class
///  . |
///  7 |         public void Add(int count;
///    |                                  ^ unexpected `;`
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
