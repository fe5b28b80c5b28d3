//! # Classmap Parser
//!
//! Grammar, parse tree and structural extraction for a subset of C#. This
//! crate turns the text of one compilation unit into the ordered
//! [`StructuralModel`] of its classes and enumerations.
//!
//! ## Usage
//!
//! ```
//! # use classmap_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         namespace App {
//!             class Foo {
//!                 private int x;
//!                 public string Name() { return "foo"; }
//!             }
//!         }
//!     "#;
//!
//!     let model = parse(source)?;
//!     assert_eq!(model.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
mod extract;
mod lexer;
mod parser;
pub mod resolve;
mod span;
pub mod tokens;
pub mod tree;

pub use classmap_core::policy::DefaultValuePolicy;
pub use extract::{ExtractError, ExtractOptions};
pub use span::{Location, Span};

use log::{debug, trace};

use classmap_core::model::StructuralModel;

use error::ParseError;
use extract::Extractor;
use tree::Node;

/// Parse one compilation unit with the default [`ExtractOptions`].
///
/// See [`parse_with`].
pub fn parse(source: &str) -> Result<StructuralModel, ParseError> {
    parse_with(source, &ExtractOptions::default())
}

/// Parse one compilation unit into its structural model.
///
/// This is the main entry point of the crate. It runs the whole pipeline:
///
/// 1. **Strip** - Remove a leading byte order mark
/// 2. **Tokenize** - Convert source text to tokens, collecting every lexical error
/// 3. **Parse** - Build the concrete parse tree, stopping at the first grammar error
/// 4. **Extract** - Walk the tree into classes and enums in source order
///
/// Spans in the returned diagnostics index into the source *after* the byte
/// order mark was removed; see [`strip_bom`].
///
/// # Errors
///
/// Returns a [`ParseError`] holding every lexical diagnostic of the unit, or
/// the first grammar diagnostic, or the extraction diagnostic. No partial
/// model is ever returned.
///
/// # Example
///
/// ```
/// # use classmap_parser::{parse_with, DefaultValuePolicy, ExtractOptions};
/// let source = "namespace N { class C { void M(double d = 0.5) { } } }";
///
/// let options = ExtractOptions::new(DefaultValuePolicy::Reject);
/// assert!(parse_with(source, &options).is_err());
/// ```
pub fn parse_with(source: &str, options: &ExtractOptions) -> Result<StructuralModel, ParseError> {
    let source = strip_bom(source);
    debug!(bytes = source.len(); "Parsing compilation unit");

    let unit = parse_tree(source)?;
    trace!(tree:% = unit; "Parse tree");

    let model = Extractor::new(options).build(&unit).map_err(error::Diagnostic::from)?;

    debug!(entities = model.len(); "Compilation unit parsed");
    Ok(model)
}

/// Tokenize and parse one compilation unit into its concrete parse tree.
///
/// The tree borrows from `source`. Unlike [`parse`], the byte order mark is
/// not stripped here.
pub fn parse_tree(source: &str) -> Result<Node<'_>, ParseError> {
    let tokens = lexer::tokenize(source)?;
    trace!(tokens = tokens.len(); "Tokenized");

    let unit = parser::build_tree(source, &tokens)?;
    Ok(unit)
}

/// Remove a leading UTF-8 byte order mark, if any.
pub fn strip_bom(source: &str) -> &str {
    source.strip_prefix('\u{feff}').unwrap_or(source)
}
