//! CLI logic for the classmap tool.
//!
//! This module contains the core CLI logic: resolving inputs, extracting
//! and merging their models, and writing the result as JSON or text.

pub mod error_adapter;

mod args;
mod config;
mod inputs;

pub use args::{Args, OutputFormat};

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use log::{info, warn};

use classmap::{
    ClassmapError, ModelBuilder, SourceUnit,
    config::AppConfig,
    model::StructuralModel,
};

/// Run the classmap CLI application
///
/// This function reads every input unit, extracts them in parallel, merges
/// the result unless disabled, and writes the model to the output file or
/// stdout.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `ClassmapError` for:
/// - Input resolution and file I/O errors
/// - Configuration loading errors
/// - Parse failures when `--strict` is set
/// - Internal extraction errors, with or without `--strict`
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), ClassmapError> {
    info!(
        inputs:? = args.inputs,
        output_path:? = args.output,
        format:? = args.format;
        "Processing sources"
    );

    // Load configuration, then apply command-line overrides
    let app_config = config::load_config(args.config.as_ref())?;
    let mut extract = app_config.extract().clone();
    if args.no_merge {
        extract = extract.with_merge(false);
    }
    if let Some(policy) = args.default_values {
        extract = extract.with_default_values(policy);
    }
    let app_config = AppConfig::new(extract, app_config.render().clone());

    // Read input files
    let files = inputs::resolve_inputs(&args.inputs, &args.exclude)?;
    let units = read_units(&files)?;

    // Extract using the ModelBuilder API
    let builder = ModelBuilder::new(app_config);
    let output = builder.extract_units(&units)?;

    let model = if args.strict {
        output.into_result()?
    } else {
        let (model, failures) = output.into_partial_result()?;
        for failure in &failures {
            let (line, column) = failure
                .location()
                .map_or((0, 0), |location| (location.line, location.column));
            warn!(
                file = failure.name(),
                line = line,
                column = column;
                "Skipping unit: {}",
                failure.error()
            );
        }
        model
    };

    let rendered = render(&builder, &model, args.format)?;
    write_output(args.output.as_deref(), &rendered)?;

    info!(entities = model.len(); "Model written successfully");

    Ok(())
}

fn read_units(files: &[PathBuf]) -> Result<Vec<SourceUnit>, ClassmapError> {
    files
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).map_err(|err| {
                io::Error::new(err.kind(), format!("{}: {err}", path.display()))
            })?;
            Ok(SourceUnit::new(path.display().to_string(), text))
        })
        .collect()
}

fn render(
    builder: &ModelBuilder,
    model: &StructuralModel,
    format: OutputFormat,
) -> Result<String, ClassmapError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(model)
            .map(|json| json + "\n")
            .map_err(|err| ClassmapError::Render(err.to_string())),
        OutputFormat::Text => builder.render_text(model),
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<(), ClassmapError> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            info!(output_file = path; "Output written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
