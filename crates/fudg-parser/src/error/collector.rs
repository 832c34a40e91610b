//! Collector for accumulating diagnostics during a processing phase.
//!
//! The semantic stage reports every violation at once; the
//! [`DiagnosticCollector`] gathers them before they are wrapped in a
//! [`GflError`].

use crate::error::{Diagnostic, ErrorKind, GflError};

/// A collector for accumulating diagnostics during a processing phase.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection, failing as `kind` if any error was emitted.
    ///
    /// Warnings are discarded in the success case.
    pub fn finish(self, kind: ErrorKind) -> Result<(), GflError> {
        if self.has_errors {
            Err(GflError::new(kind, self.diagnostics))
        } else {
            Ok(())
        }
    }
}
