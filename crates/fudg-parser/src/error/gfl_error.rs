//! The [`GflError`] type returned by [`parse`](crate::parse).
//!
//! It wraps the diagnostics of the failing stage together with the stage
//! itself, so callers can tell a typo in the annotation (`Lex`, `Syntax`) from
//! a mention that does not fit the sentence (`Reference`) or a graph that
//! cannot be built (`Build`, `Semantic`).

use std::fmt;

use crate::{
    error::Diagnostic,
    span::{Position, Span},
};

/// The pipeline stage an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lex,
    Syntax,
    Reference,
    Build,
    Semantic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Lex => "lex error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Reference => "reference error",
            ErrorKind::Build => "build error",
            ErrorKind::Semantic => "semantic error",
        };
        f.write_str(name)
    }
}

/// Why the graph builder gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildErrorKind {
    DuplicateEdge,
    ConflictingGroup,
    UnknownNodeReference,
}

/// Error type for the compilation pipeline.
///
/// Holds at least one diagnostic. Every stage except semantic validation
/// stops at its first diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GflError {
    kind: ErrorKind,
    diagnostics: Vec<Diagnostic>,
    position: Option<Position>,
}

impl GflError {
    /// Create an error for `kind` from its diagnostics.
    pub fn new(kind: ErrorKind, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            kind,
            diagnostics,
            position: None,
        }
    }

    /// Resolve the location of the first primary label against `source`.
    pub fn with_source(mut self, source: &str) -> Self {
        self.position = self
            .span()
            .map(|span| Position::from_offset(source, span.start()));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The builder failure, for errors of kind [`ErrorKind::Build`].
    pub fn build_kind(&self) -> Option<BuildErrorKind> {
        self.diagnostics
            .first()
            .and_then(Diagnostic::code)
            .and_then(|code| code.build_kind())
    }

    /// Message of the first diagnostic.
    pub fn message(&self) -> &str {
        self.diagnostics
            .first()
            .map(Diagnostic::message)
            .unwrap_or_default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Span of the first primary label, if any diagnostic has one.
    pub fn span(&self) -> Option<Span> {
        self.diagnostics
            .iter()
            .find_map(Diagnostic::primary_label)
            .map(|label| label.span())
    }

    /// 1-based line and column, available once the source is attached.
    pub fn position(&self) -> Option<Position> {
        self.position
    }
}

impl fmt::Display for GflError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{}", first)?;
            if let Some(position) = self.position {
                write!(f, " ({position})")?;
            }
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        } else {
            write!(f, "{}", self.kind)?;
        }
        Ok(())
    }
}

impl std::error::Error for GflError {}
