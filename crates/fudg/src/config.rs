//! Configuration types for FUDG conversions.
//!
//! All types implement [`serde::Deserialize`] with every field defaulted,
//! so a configuration file only needs the keys it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration.
//! - [`SemanticsConfig`] - Whether the semantic validator runs.
//! - [`OutputConfig`] - How JSON output is formatted.
//!
//! # Example
//!
//! ```
//! # use fudg::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(!config.semantics().check());
//! assert!(!config.output().pretty());
//! ```

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Semantic validation section.
    #[serde(default)]
    semantics: SemanticsConfig,

    /// Output formatting section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(semantics: SemanticsConfig, output: OutputConfig) -> Self {
        Self { semantics, output }
    }

    /// Returns the semantic validation configuration.
    pub fn semantics(&self) -> &SemanticsConfig {
        &self.semantics
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

/// Semantic validation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SemanticsConfig {
    /// Run coverage, overlap and rootedness checks after building.
    #[serde(default)]
    check: bool,
}

impl SemanticsConfig {
    pub fn new(check: bool) -> Self {
        Self { check }
    }

    pub fn check(&self) -> bool {
        self.check
    }
}

/// JSON output settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Indent the JSON document instead of printing it on one line.
    #[serde(default)]
    pretty: bool,
}

impl OutputConfig {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }
}
