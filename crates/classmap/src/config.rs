//! Configuration types for classmap extraction and rendering.
//!
//! This module provides configuration structures that control how source
//! units are extracted and how models are rendered. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining extraction and render settings.
//! - [`ExtractConfig`] - Controls merging, the default value policy and the worker pool.
//! - [`RenderConfig`] - Controls the text renderer layout.
//!
//! # Example
//!
//! ```
//! # use classmap::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.extract().merge());
//! assert_eq!(config.render().padding(), 1);
//! ```

use serde::Deserialize;

use classmap_core::policy::DefaultValuePolicy;
use classmap_parser::ExtractOptions;

/// Top-level application configuration combining extraction and render settings.
///
/// Groups [`ExtractConfig`] and [`RenderConfig`] into a single configuration
/// root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Extraction configuration section.
    #[serde(default)]
    extract: ExtractConfig,

    /// Render configuration section.
    #[serde(default)]
    render: RenderConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified extraction and render configurations.
    ///
    /// # Arguments
    ///
    /// * `extract` - Extraction settings.
    /// * `render` - Text rendering settings.
    pub fn new(extract: ExtractConfig, render: RenderConfig) -> Self {
        Self { extract, render }
    }

    /// Returns the extraction configuration.
    pub fn extract(&self) -> &ExtractConfig {
        &self.extract
    }

    /// Returns the render configuration.
    pub fn render(&self) -> &RenderConfig {
        &self.render
    }
}

/// Extraction configuration.
///
/// Controls whether the merger runs after extraction, how unsupported
/// parameter defaults are handled and how many workers batch extraction
/// uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractConfig {
    /// Run the diagram merger after extraction.
    #[serde(default = "default_merge")]
    merge: bool,

    /// What to do with parameter defaults that are not integers or strings.
    #[serde(default)]
    default_values: DefaultValuePolicy,

    /// Size of the batch worker pool; `None` uses the global pool.
    #[serde(default)]
    workers: Option<usize>,
}

fn default_merge() -> bool {
    true
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            merge: default_merge(),
            default_values: DefaultValuePolicy::default(),
            workers: None,
        }
    }
}

impl ExtractConfig {
    /// Creates a new [`ExtractConfig`].
    ///
    /// # Arguments
    ///
    /// * `merge` - Whether to run the diagram merger.
    /// * `default_values` - Handling of unsupported parameter defaults.
    /// * `workers` - Worker pool size, `None` for the global pool.
    pub fn new(merge: bool, default_values: DefaultValuePolicy, workers: Option<usize>) -> Self {
        Self {
            merge,
            default_values,
            workers,
        }
    }

    /// Returns whether the merger runs after extraction.
    pub fn merge(&self) -> bool {
        self.merge
    }

    /// Returns a copy of this configuration with merging switched on or off.
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    pub fn default_values(&self) -> DefaultValuePolicy {
        self.default_values
    }

    /// Returns a copy of this configuration with another default value policy.
    pub fn with_default_values(mut self, default_values: DefaultValuePolicy) -> Self {
        self.default_values = default_values;
        self
    }

    /// Returns the configured worker count. Zero is treated as unset.
    pub fn workers(&self) -> Option<usize> {
        self.workers.filter(|&workers| workers > 0)
    }

    /// The parser options these settings translate to.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::new(self.default_values)
    }
}

/// Text rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    /// Spaces between a box border and its text.
    #[serde(default = "default_padding")]
    padding: usize,
}

fn default_padding() -> usize {
    1
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: default_padding(),
        }
    }
}

impl RenderConfig {
    /// Creates a new [`RenderConfig`] with the given padding.
    pub fn new(padding: usize) -> Self {
        Self { padding }
    }

    /// Returns the padding between a box border and its text.
    pub fn padding(&self) -> usize {
        self.padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.extract().merge());
        assert_eq!(config.extract().default_values(), DefaultValuePolicy::Drop);
        assert_eq!(config.extract().workers(), None);
        assert_eq!(config.render().padding(), 1);
    }

    #[test]
    fn test_full_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [extract]
            merge = false
            default_values = "keep"
            workers = 4

            [render]
            padding = 2
            "#,
        )
        .expect("config should deserialize");

        assert!(!config.extract().merge());
        assert_eq!(config.extract().default_values(), DefaultValuePolicy::Keep);
        assert_eq!(config.extract().workers(), Some(4));
        assert_eq!(config.render().padding(), 2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [extract]
            default_values = "reject"
            "#,
        )
        .expect("config should deserialize");

        assert!(config.extract().merge());
        assert_eq!(config.extract().default_values(), DefaultValuePolicy::Reject);
        assert_eq!(config.render(), &RenderConfig::default());

        let empty: AppConfig = toml::from_str("").expect("empty config should deserialize");
        assert_eq!(empty, AppConfig::default());
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [extract]
            default_values = "ignore"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_workers_means_unset() {
        let config = ExtractConfig::new(true, DefaultValuePolicy::Drop, Some(0));
        assert_eq!(config.workers(), None);
    }
}
