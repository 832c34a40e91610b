//! FUDG CLI library
//!
//! This module contains the core CLI logic: read one document, convert its
//! annotation and write the JSON graph.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Read, Write},
};

use log::info;

use fudg::{Converter, FudgError};

/// Exit status for documents whose annotation fails to convert.
pub const GFL_FAILURE_EXIT_CODE: i32 = 100;

/// Convert a document with the configuration selected by `args`.
///
/// # Errors
///
/// Returns `FudgError` for configuration errors and annotation errors.
pub fn convert(args: &Args, document: &str) -> Result<String, FudgError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let app_config = config::apply_overrides(app_config, args);

    Converter::new(app_config).convert_document(document)
}

/// Run the FUDG CLI application
///
/// Reads the input document (a file, or standard input when no path is
/// given), converts it, and writes the JSON graph followed by a newline to
/// the output file or standard output.
///
/// # Errors
///
/// Returns `FudgError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - GFL errors of any stage
pub fn run(args: &Args) -> Result<(), FudgError> {
    info!(
        input_path = args.input.as_deref().unwrap_or("-"),
        output_path = args.output.as_deref().unwrap_or("-");
        "Processing document"
    );

    let document = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mut json = convert(args, &document)?;
    json.push('\n');

    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            info!(output_file = path; "Graph written");
        }
        None => io::stdout().lock().write_all(json.as_bytes())?,
    }

    Ok(())
}

/// Process exit status for a failed run.
pub fn exit_code(err: &FudgError) -> i32 {
    match err {
        FudgError::Parse { .. } => GFL_FAILURE_EXIT_CODE,
        _ => 1,
    }
}
