//! Command-line argument definitions for the classmap CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input selection, the output path and
//! format, extraction switches, configuration file selection, and logging
//! verbosity.

use std::str::FromStr;

use clap::{Parser, ValueEnum};

use classmap::policy::DefaultValuePolicy;

/// Output format of the extracted model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Entities as a JSON array
    #[default]
    Json,
    /// UML class boxes drawn in plain text
    Text,
}

/// Command-line arguments for the classmap tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// C# source files or glob patterns such as `src/**/*.cs`
    #[arg(required = true, help = "Input files or glob patterns")]
    pub inputs: Vec<String>,

    /// Glob pattern of paths to skip; may be repeated
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Path to the output file; stdout when absent
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Keep entities that share a namespace and name apart
    #[arg(long)]
    pub no_merge: bool,

    /// Fail when any input does not parse
    #[arg(long)]
    pub strict: bool,

    /// Handling of unsupported parameter defaults (drop, reject, keep);
    /// overrides the configuration file
    #[arg(long, value_name = "POLICY", value_parser = DefaultValuePolicy::from_str)]
    pub default_values: Option<DefaultValuePolicy>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["classmap", "a.cs"]).unwrap();
        assert_eq!(args.inputs, ["a.cs"]);
        assert!(args.exclude.is_empty());
        assert_eq!(args.output, None);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.no_merge);
        assert!(!args.strict);
        assert_eq!(args.default_values, None);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_all_options() {
        let args = Args::try_parse_from([
            "classmap",
            "src/**/*.cs",
            "extra.cs",
            "--exclude",
            "**/obj/**",
            "--exclude",
            "**/*.g.cs",
            "-o",
            "model.txt",
            "-f",
            "text",
            "--no-merge",
            "--strict",
            "--default-values",
            "keep",
            "-c",
            "classmap.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.inputs, ["src/**/*.cs", "extra.cs"]);
        assert_eq!(args.exclude, ["**/obj/**", "**/*.g.cs"]);
        assert_eq!(args.output.as_deref(), Some("model.txt"));
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.no_merge);
        assert!(args.strict);
        assert_eq!(args.default_values, Some(DefaultValuePolicy::Keep));
        assert_eq!(args.config.as_deref(), Some("classmap.toml"));
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Args::try_parse_from(["classmap"]).is_err());
        assert!(Args::try_parse_from(["classmap", "a.cs", "-f", "svg"]).is_err());
    }

    #[test]
    fn test_default_values_policy_spelling() {
        let args =
            Args::try_parse_from(["classmap", "a.cs", "--default-values", "reject"]).unwrap();
        assert_eq!(args.default_values, Some(DefaultValuePolicy::Reject));

        let err = Args::try_parse_from(["classmap", "a.cs", "--default-values", "Keep"])
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported default value policy"));
    }
}
