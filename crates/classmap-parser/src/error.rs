//! Error and diagnostic system for the classmap parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error message with optional error code, multiple source
//! locations, and help text. Multiple diagnostics are wrapped in [`ParseError`]
//! for returning from [`parse`](crate::parse).
//!
//! # Example
//!
//! ```
//! # use classmap_parser::error::{Diagnostic, ErrorCode};
//! # use classmap_parser::Span;
//!
//! let span = Span::new(40..46);
//!
//! let diag = Diagnostic::error("unexpected token: expected class or enum declaration")
//!     .with_code(ErrorCode::E102)
//!     .with_label(span, "not a type declaration")
//!     .with_help("only classes and enums may appear inside a namespace");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
