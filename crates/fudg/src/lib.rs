//! FUDG - convert GFL annotations into FUDG dependency graphs.
//!
//! GFL is a lightweight notation for relations among the words of a
//! tokenized sentence. This crate ties the [`fudg_parser`] pipeline to a
//! configuration and JSON output.

pub mod config;

mod document;
mod error;

pub use fudg_core::{graph, identifier, json, validate};
pub use fudg_parser::ParseOptions;

pub use document::Document;
pub use error::FudgError;

use log::{debug, info};
use serde_json::Value;

use config::AppConfig;
use graph::Parse;
use validate::Rule;

/// Converter from GFL annotations to FUDG graphs.
///
/// # Examples
///
/// ```
/// use fudg::{Converter, config::AppConfig};
///
/// let converter = Converter::new(AppConfig::default());
///
/// let words = ["the", "cat", "sat"];
/// let json = converter.convert(&words, "sat > [the cat]*cat")
///     .expect("Failed to convert");
/// assert!(json.starts_with(r#"{"tokens":["the","cat","sat"]"#));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: AppConfig,
    options: ParseOptions,
}

impl Converter {
    /// Create a new converter with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let options = ParseOptions::default().with_semantic_checks(config.semantics().check());
        Self { config, options }
    }

    /// Add a semantic rule, checked when semantic validation is enabled.
    pub fn with_rule(mut self, rule: impl Rule + Send + Sync + 'static) -> Self {
        self.options = self.options.with_rule(rule);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse an annotation over a tokenized sentence.
    ///
    /// # Errors
    ///
    /// Returns [`FudgError::Parse`] for lexical, syntax, reference, build
    /// and, when enabled, semantic errors.
    pub fn parse<S: AsRef<str>>(&self, words: &[S], source: &str) -> Result<Parse, FudgError> {
        fudg_parser::parse(words, source, &self.options)
            .map_err(|err| FudgError::new_parse_error(err, source))
    }

    /// Parse an annotation and serialize the graph as JSON text.
    ///
    /// The output is on one line unless the configuration asks for pretty
    /// printing.
    pub fn convert<S: AsRef<str>>(&self, words: &[S], source: &str) -> Result<String, FudgError> {
        let parse = self.parse(words, source)?;
        let json = if self.config.output().pretty() {
            parse.to_json_string_pretty()
        } else {
            parse.to_json_string()
        };
        debug!(bytes = json.len(); "Graph serialized");
        Ok(json)
    }

    /// Convert a whole [`Document`]: a sentence line followed by its
    /// annotation.
    pub fn convert_document(&self, text: &str) -> Result<String, FudgError> {
        let document = Document::parse(text);
        info!(words = document.words().len(); "Converting document");
        self.convert(document.words(), document.annotation())
            .map_err(|err| err.in_document(text, document.annotation_offset()))
    }
}

/// Parse an annotation and return the graph as a JSON value.
///
/// # Example
///
/// ```
/// let value = fudg::to_json(&["a", "b"], "a > b :x", false).expect("valid annotation");
/// assert_eq!(value["edges"][0]["label"], "x");
/// ```
pub fn to_json<S: AsRef<str>>(
    words: &[S],
    source: &str,
    check_semantics: bool,
) -> Result<Value, FudgError> {
    let options = ParseOptions::default().with_semantic_checks(check_semantics);
    fudg_parser::parse(words, source, &options)
        .map(|parse| parse.to_json())
        .map_err(|err| FudgError::new_parse_error(err, source))
}
