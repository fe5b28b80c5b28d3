//! Input discovery for the CLI
//!
//! Expands the positional inputs into an ordered list of files. An input
//! that names an existing file is taken as is; anything else is treated as
//! a glob pattern. Paths matching an `--exclude` pattern are skipped.

use std::{
    collections::HashSet,
    io,
    path::{Path, PathBuf},
};

use glob::Pattern;
use log::{debug, warn};
use thiserror::Error;

use classmap::ClassmapError;

/// Input discovery errors
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Cannot read matched path: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("No input files found")]
    Empty,
}

impl From<InputError> for ClassmapError {
    fn from(err: InputError) -> Self {
        ClassmapError::Io(io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))
    }
}

fn compile(pattern: &str) -> Result<Pattern, InputError> {
    Pattern::new(pattern).map_err(|source| InputError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Resolve inputs and exclusions to a list of files.
///
/// Files keep the order of the inputs that produced them; matches of one
/// pattern are in the order `glob` yields them. A file reached by several
/// inputs is listed once.
///
/// # Errors
///
/// Returns [`InputError`] for malformed patterns, unreadable matches, or
/// when nothing is left to process.
pub fn resolve_inputs(inputs: &[String], exclude: &[String]) -> Result<Vec<PathBuf>, InputError> {
    let exclude = exclude
        .iter()
        .map(|pattern| compile(pattern))
        .collect::<Result<Vec<_>, _>>()?;
    let is_excluded = |path: &Path| exclude.iter().any(|pattern| pattern.matches_path(path));

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut push = |path: PathBuf| {
        if is_excluded(&path) {
            debug!(path = path.display().to_string(); "Excluded input");
        } else if seen.insert(path.clone()) {
            files.push(path);
        }
    };

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            push(path.to_path_buf());
            continue;
        }

        let paths = glob::glob(input).map_err(|source| InputError::Pattern {
            pattern: input.clone(),
            source,
        })?;

        let mut matched = 0;
        for entry in paths {
            let path = entry?;
            if path.is_file() {
                matched += 1;
                push(path);
            }
        }

        if matched == 0 {
            warn!(input = input.as_str(); "Input matched no files");
        }
    }

    if files.is_empty() {
        return Err(InputError::Empty);
    }

    debug!(files = files.len(); "Resolved inputs");
    Ok(files)
}
