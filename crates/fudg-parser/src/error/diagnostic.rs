//! The core diagnostic type for the GFL error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, multiple labeled source spans, and help text.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A rich diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// error[E201]: `the` occurs 2 times in the sentence
///   |
/// 1 | the > cat
///   | ^^^ ambiguous word
///   |
///   = help: pick one occurrence with `the_1` .. `the_2`
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use fudg_parser::error::{Diagnostic, ErrorCode};
    /// # use fudg_parser::Span;
    ///
    /// let diag = Diagnostic::error("`dog` does not occur in the sentence")
    ///     .with_code(ErrorCode::E200)
    ///     .with_label(Span::new(0..3), "unknown word")
    ///     .with_help("words are matched case-sensitively");
    /// assert_eq!(diag.to_string(), "error[E200]: `dog` does not occur in the sentence");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The first primary label, which locates the diagnostic.
    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().find(|label| label.is_primary())
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("group overlaps an earlier group")
            .with_code(ErrorCode::E204)
            .with_label(Span::new(20..31), "overlapping group")
            .with_secondary_label(Span::new(0..10), "first declared here")
            .with_help("a token can belong to only one group");

        assert_eq!(diag.code(), Some(ErrorCode::E204));
        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[1].is_secondary());
        assert_eq!(
            diag.primary_label().map(Label::span),
            Some(Span::new(20..31))
        );
        assert_eq!(diag.help(), Some("a token can belong to only one group"));
    }

    #[test]
    fn test_primary_label_skips_secondary() {
        let diag = Diagnostic::error("duplicate edge")
            .with_secondary_label(Span::new(0..5), "first declared here")
            .with_label(Span::new(6..11), "declared again");

        assert_eq!(
            diag.primary_label().map(Label::span),
            Some(Span::new(6..11))
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("unknown word `dog`").with_code(ErrorCode::E200);
        assert_eq!(diag.to_string(), "error[E200]: unknown word `dog`");

        let diag = Diagnostic::warning("unused alias");
        assert_eq!(diag.to_string(), "warning: unused alias");
    }
}
