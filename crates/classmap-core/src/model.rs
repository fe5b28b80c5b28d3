//! Structural model types.
//!
//! These types represent the result of extracting declarations from source
//! text. They are plain immutable values: the extractor builds them once and
//! later stages (merging, rendering, serialization) only read or recombine
//! them.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text
//!     ↓ lexer
//! Tokens
//!     ↓ parser
//! Parse Tree
//!     ↓ extract
//! Structural Model (these types)
//!     ↓ merge (optional)
//! Structural Model
//!     ↓ render (external)
//! ```
//!
//! # Organization
//!
//! - [`member`] - Class members: [`Attribute`], [`Method`], [`Parameter`] and their enums
//! - [`entity`] - Top-level declarations: [`ClassEntity`], [`EnumEntity`], [`Entity`], [`StructuralModel`]

pub mod entity;
pub mod member;

pub use entity::*;
pub use member::*;
