//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in the annotation source.
///
/// A diagnostic normally carries one primary label marking where the problem
/// is, plus secondary labels for context such as the statement being parsed
/// or the group a token was first declared in.
///
/// ```text
/// error[E204]: group overlaps an earlier group
///   |
/// 1 | [New York] > x
///   | ---------- first declared here
/// 2 | [York City] > y
///   | ^^^^^^^^^^^ overlapping group
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
