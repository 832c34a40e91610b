//! Command-line argument definitions for the FUDG CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input document, the output
//! destination, configuration overrides and logging verbosity.

use clap::Parser;

/// Command-line arguments for the GFL to FUDG converter
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Document to convert: the sentence tokens on the first line, the GFL
    /// annotation below. Reads standard input when omitted.
    #[arg(help = "Path to the input document (default: stdin)")]
    pub input: Option<String>,

    /// Write the JSON graph to this file instead of standard output
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Run the semantic validator, whatever the configuration says
    #[arg(long)]
    pub check_semantics: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
