//! Batch extraction over many source units.
//!
//! Units are parsed in parallel on a `rayon` pool and their models are
//! concatenated in input order, so the result does not depend on how the
//! work was scheduled. A unit that fails to parse does not stop the others;
//! its diagnostics are kept as a [`UnitFailure`].

use std::fmt;

use log::{debug, error, info};
use rayon::prelude::*;

use classmap_core::model::{Entity, StructuralModel};
use classmap_parser::{
    ExtractOptions, Location,
    error::{ErrorCode, ParseError},
    strip_bom,
};

use crate::error::ClassmapError;

/// One compilation unit: a display name and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    name: String,
    text: String,
}

impl SourceUnit {
    /// Creates a unit. A leading byte order mark is removed from `text`, so
    /// diagnostic spans index into [`SourceUnit::text`] directly.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut text = text.into();
        let bom = text.len() - strip_bom(&text).len();
        text.drain(..bom);

        Self {
            name: name.into(),
            text,
        }
    }

    /// Returns the name used in reports, usually a file path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A unit that failed to parse, with its diagnostics and text.
#[derive(Debug, Clone)]
pub struct UnitFailure {
    name: String,
    source: String,
    error: ParseError,
}

impl UnitFailure {
    fn new(unit: &SourceUnit, error: ParseError) -> Self {
        Self {
            name: unit.name.clone(),
            source: unit.text.clone(),
            error,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the text of the unit the diagnostic spans refer to.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn error(&self) -> &ParseError {
        &self.error
    }

    /// Line and column of the first diagnostic, if it has a span.
    pub fn location(&self) -> Option<Location> {
        self.error
            .diagnostics()
            .first()
            .and_then(|diag| diag.primary_span())
            .map(|span| span.location(&self.source))
    }

    /// Returns `true` when the unit failed on an internal error (E300)
    /// rather than on a problem with its text.
    pub fn is_internal(&self) -> bool {
        self.error
            .diagnostics()
            .iter()
            .any(|diag| diag.code() == Some(ErrorCode::E300))
    }
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(location) => write!(f, "{}:{}: {}", self.name, location, self.error),
            None => write!(f, "{}: {}", self.name, self.error),
        }
    }
}

/// The result of extracting a batch of units.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    model: StructuralModel,
    failures: Vec<UnitFailure>,
    total: usize,
}

impl BatchOutput {
    /// The combined model of every unit that parsed.
    pub fn model(&self) -> &StructuralModel {
        &self.model
    }

    /// The units that failed, in input order.
    pub fn failures(&self) -> &[UnitFailure] {
        &self.failures
    }

    /// Number of units in the batch, failed ones included.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns `true` when every unit parsed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The model of the units that parsed, with the units that failed on
    /// their input.
    ///
    /// # Errors
    ///
    /// Internal failures are never skipped: if any unit hit one, returns
    /// [`ClassmapError::Batch`] holding only those units.
    pub fn into_partial_result(
        self,
    ) -> Result<(StructuralModel, Vec<UnitFailure>), ClassmapError> {
        if !self.failures.iter().any(UnitFailure::is_internal) {
            return Ok((self.model, self.failures));
        }

        let failures: Vec<UnitFailure> = self
            .failures
            .into_iter()
            .filter(UnitFailure::is_internal)
            .collect();
        for failure in &failures {
            error!(unit = failure.name(); "Internal extraction error: {}", failure.error());
        }
        Err(ClassmapError::Batch {
            failures,
            total: self.total,
        })
    }

    /// The model, or [`ClassmapError::Batch`] if any unit failed.
    pub fn into_result(self) -> Result<StructuralModel, ClassmapError> {
        if self.is_complete() {
            Ok(self.model)
        } else {
            Err(ClassmapError::Batch {
                failures: self.failures,
                total: self.total,
            })
        }
    }

    pub(crate) fn map_model(self, f: impl FnOnce(StructuralModel) -> StructuralModel) -> Self {
        Self {
            model: f(self.model),
            ..self
        }
    }
}

fn extract_unit(unit: &SourceUnit, options: &ExtractOptions) -> Result<StructuralModel, UnitFailure> {
    classmap_parser::parse_with(unit.text(), options).map_err(|err| {
        let failure = UnitFailure::new(unit, err);
        debug!(
            unit = unit.name(),
            location:? = failure.location(),
            diagnostics = failure.error().diagnostics().len();
            "Unit failed to parse"
        );
        failure
    })
}

/// Parse every unit and concatenate the models in input order.
///
/// # Errors
///
/// Only fails when a dedicated worker pool cannot be created. Unit failures
/// are reported in [`BatchOutput::failures`].
pub(crate) fn extract_units(
    units: &[SourceUnit],
    options: &ExtractOptions,
    workers: Option<usize>,
) -> Result<BatchOutput, ClassmapError> {
    info!(units = units.len(), workers:? = workers; "Extracting units");

    let run = || -> Vec<Result<StructuralModel, UnitFailure>> {
        units
            .par_iter()
            .map(|unit| extract_unit(unit, options))
            .collect()
    };

    let results = match workers {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(run),
        None => run(),
    };

    let mut entities: Vec<Entity> = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(model) => entities.extend(model),
            Err(failure) => failures.push(failure),
        }
    }

    debug!(
        entities = entities.len(),
        failures = failures.len();
        "Batch extraction completed"
    );

    Ok(BatchOutput {
        model: StructuralModel::new(entities),
        failures,
        total: units.len(),
    })
}
