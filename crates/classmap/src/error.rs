//! Error types for classmap operations.
//!
//! This module provides the main error type [`ClassmapError`] which wraps
//! the error conditions that can occur while extracting and rendering
//! structural models.

use std::io;

use thiserror::Error;

use classmap_parser::error::ParseError;

use crate::batch::UnitFailure;

/// The main error type for classmap operations.
///
/// # Diagnostic Variants
///
/// The `Parse` and `Batch` variants carry the source text next to the
/// structured diagnostics, so callers can report errors with source
/// snippets.
#[derive(Debug, Error)]
pub enum ClassmapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("{} of {total} units failed to parse", failures.len())]
    Batch {
        failures: Vec<UnitFailure>,
        total: usize,
    },

    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Render error: {0}")]
    Render(String),
}

impl ClassmapError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
