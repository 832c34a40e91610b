//! Error types for FUDG conversions.
//!
//! This module provides the main error type [`FudgError`] which wraps
//! the failures that can occur while turning an annotation into a graph.

use std::io;

use thiserror::Error;

use fudg_parser::error::GflError;

/// The main error type for FUDG operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the [`GflError`] together with the text it
/// was read from. Diagnostic spans are relative to the annotation, which
/// starts `offset` bytes into `src`.
#[derive(Debug, Error)]
pub enum FudgError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse {
        err: GflError,
        src: String,
        offset: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FudgError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: GflError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
            offset: 0,
        }
    }

    /// Point a `Parse` error at the whole document its annotation came
    /// from. Other variants are returned unchanged.
    pub fn in_document(self, text: &str, annotation_offset: usize) -> Self {
        match self {
            Self::Parse { err, .. } => Self::Parse {
                err,
                src: text.to_string(),
                offset: annotation_offset,
            },
            other => other,
        }
    }

    /// The GFL error, if this is a parse failure.
    pub fn gfl_error(&self) -> Option<&GflError> {
        match self {
            Self::Parse { err, .. } => Some(err),
            _ => None,
        }
    }
}
