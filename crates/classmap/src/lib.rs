//! Classmap - UML class models from C# sources.
//!
//! Extraction, merging and rendering of the classes and enumerations declared
//! in a set of C# compilation units. Parsing lives in `classmap-parser`; this
//! crate adds the diagram merger, parallel batch extraction, configuration
//! and text rendering behind [`ModelBuilder`].

pub mod config;
pub mod merge;
pub mod render;

mod batch;
mod error;

pub use classmap_core::{model, policy};

pub use batch::{BatchOutput, SourceUnit, UnitFailure};
pub use error::ClassmapError;

use log::{debug, info, trace};

use config::AppConfig;
use model::StructuralModel;
use render::{Renderer, TextRenderer};

/// Builder for extracting, merging and rendering class models.
///
/// # Examples
///
/// ```rust
/// use classmap::{ModelBuilder, config::AppConfig};
///
/// let source = "namespace App { class Foo { private int x; } }";
///
/// // With custom config
/// let config = AppConfig::default();
/// let builder = ModelBuilder::new(config);
///
/// // Parse source to a structural model
/// let model = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Render the model as text
/// let text = builder.render_text(&model)
///     .expect("Failed to render");
/// assert!(text.contains("App.Foo"));
///
/// // Or use default config
/// let builder = ModelBuilder::default();
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    config: AppConfig,
}

impl ModelBuilder {
    /// Create a new model builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including extraction and render settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this builder was created with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse one compilation unit into a structural model.
    ///
    /// Partial declarations within the unit are consolidated when merging is
    /// enabled in the configuration.
    ///
    /// # Arguments
    ///
    /// * `source` - C# source code as a string
    ///
    /// # Errors
    ///
    /// Returns [`ClassmapError::Parse`] for lexical, syntax or extraction
    /// errors, carrying the source for reporting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classmap::ModelBuilder;
    ///
    /// let source = "namespace App { enum Color { Red, Green, Blue } }";
    /// let model = ModelBuilder::default().parse(source)
    ///     .expect("Failed to parse unit");
    /// assert_eq!(model.len(), 1);
    /// ```
    pub fn parse(&self, source: &str) -> Result<StructuralModel, ClassmapError> {
        info!("Parsing unit");

        let options = self.config.extract().extract_options();
        let model = classmap_parser::parse_with(source, &options).map_err(|err| {
            ClassmapError::new_parse_error(err, classmap_parser::strip_bom(source))
        })?;

        debug!(entities = model.len(); "Unit parsed successfully");
        let model = self.merge_if_enabled(model);
        trace!(model:?; "Parsed model");

        Ok(model)
    }

    /// Parse several compilation units in parallel.
    ///
    /// Unit models are concatenated in input order and merged once when
    /// merging is enabled. A unit that fails does not stop the others; see
    /// [`BatchOutput::failures`] and [`BatchOutput::into_result`].
    ///
    /// # Errors
    ///
    /// Returns [`ClassmapError::Pool`] if the configured worker pool cannot
    /// be created.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classmap::{ModelBuilder, SourceUnit};
    ///
    /// let units = [
    ///     SourceUnit::new("a.cs", "namespace App { partial class Foo { int x; } }"),
    ///     SourceUnit::new("b.cs", "namespace App { partial class Foo { int y; } }"),
    /// ];
    /// let output = ModelBuilder::default().extract_units(&units)
    ///     .expect("Failed to extract");
    /// assert_eq!(output.model().len(), 1);
    /// ```
    pub fn extract_units(&self, units: &[SourceUnit]) -> Result<BatchOutput, ClassmapError> {
        let extract = self.config.extract();
        let output = batch::extract_units(units, &extract.extract_options(), extract.workers())?;

        if !output.is_complete() {
            info!(
                failed = output.failures().len(),
                total = output.total();
                "Some units failed to parse"
            );
        }

        let output = output.map_model(|model| self.merge_if_enabled(model));
        trace!(model:? = output.model(); "Extracted model");

        Ok(output)
    }

    /// Merge entities that share a namespace and name.
    ///
    /// This runs regardless of the `merge` configuration flag.
    pub fn merge(&self, model: StructuralModel) -> StructuralModel {
        merge::merge(model)
    }

    /// Render a structural model with the [`TextRenderer`].
    ///
    /// # Errors
    ///
    /// Returns [`ClassmapError::Render`] if a box cannot be drawn.
    pub fn render_text(&self, model: &StructuralModel) -> Result<String, ClassmapError> {
        info!(entities = model.len(); "Rendering text");
        TextRenderer::new().render(model, self.config.render())
    }

    fn merge_if_enabled(&self, model: StructuralModel) -> StructuralModel {
        if self.config.extract().merge() {
            merge::merge(model)
        } else {
            model
        }
    }
}
