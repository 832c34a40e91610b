//! Error and diagnostic system for the GFL parser.
//!
//! This module provides an error handling system with:
//! - Error codes grouped by pipeline stage
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. The diagnostics of a failed run are wrapped in a
//! [`GflError`] together with the [`ErrorKind`] of the failing stage.
//!
//! # Example
//!
//! ```
//! # use fudg_parser::error::{Diagnostic, ErrorCode, ErrorKind, GflError};
//! # use fudg_parser::Span;
//!
//! let diag = Diagnostic::error("group overlaps an earlier group")
//!     .with_code(ErrorCode::E204)
//!     .with_label(Span::new(15..26), "overlapping group")
//!     .with_secondary_label(Span::new(0..10), "first declared here")
//!     .with_help("a token can belong to only one group");
//!
//! let err = GflError::new(ErrorKind::Reference, vec![diag])
//!     .with_source("[New York] > x\n[York City] > y");
//! assert_eq!(err.position().map(|p| p.line), Some(2));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod gfl_error;
mod label;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use gfl_error::{BuildErrorKind, ErrorKind, GflError};
pub use label::Label;
pub use severity::Severity;

/// A type alias for `Result<T, Diagnostic>`.
pub(crate) type Result<T> = std::result::Result<T, Diagnostic>;
