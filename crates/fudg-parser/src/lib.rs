//! # FUDG Parser
//!
//! Compiler from GFL annotations over a tokenized sentence to FUDG graphs.
//!
//! ## Usage
//!
//! ```
//! # use fudg_parser::{parse, ParseOptions, error::GflError};
//!
//! fn main() -> Result<(), GflError> {
//!     let words = ["the", "cat", "chased", "the", "mouse"];
//!     let source = r#"
//!         chased > cat :nsubj
//!         chased > mouse :obj
//!         cat > the_1; mouse > the_2
//!     "#;
//!
//!     let graph = parse(&words, source, &ParseOptions::default())?;
//!     assert_eq!(graph.edges().len(), 4);
//!     Ok(())
//! }
//! ```

mod build;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod resolve;
mod semantic;
mod span;
mod tokens;

pub use build::COORDINATION_ROLE;
pub use span::{Position, Span};

pub use fudg_core::validate::{Rule, Validator, Violation};

use log::{debug, info, trace};

use fudg_core::graph::{Parse, Sentence};

use error::{ErrorKind, GflError};

/// Options for a single [`parse`] call.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    check_semantics: bool,
    validator: Validator,
}

impl ParseOptions {
    /// Enable or disable the semantic validation stage.
    pub fn with_semantic_checks(mut self, enabled: bool) -> Self {
        self.check_semantics = enabled;
        self
    }

    /// Add a rule to the semantic validator, after the default ones.
    pub fn with_rule(mut self, rule: impl Rule + Send + Sync + 'static) -> Self {
        self.validator = self.validator.with_rule(rule);
        self
    }
}

/// Parse a GFL annotation over a tokenized sentence.
///
/// The pipeline runs these stages, each failing with its own
/// [`ErrorKind`]:
///
/// 1. **Tokenize** - Split the annotation into tokens
/// 2. **Parse** - Build the statement syntax tree
/// 3. **Resolve** - Map word mentions onto sentence tokens
/// 4. **Build** - Create nodes and edges
/// 5. **Validate** - Check coverage, overlap and rootedness, if enabled
///
/// Every stage but validation stops at its first error. Validation reports
/// all violations together.
///
/// # Example
///
/// ```
/// # use fudg_parser::{parse, ParseOptions, error::ErrorKind};
///
/// let words = ["the", "cat", "chased", "the", "mouse"];
/// let err = parse(&words, "the > cat", &ParseOptions::default()).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Reference);
/// ```
pub fn parse<S: AsRef<str>>(
    words: &[S],
    source: &str,
    options: &ParseOptions,
) -> Result<Parse, GflError> {
    info!(words = words.len(), check_semantics = options.check_semantics; "Parsing annotation");
    let fail = |kind, diagnostic| GflError::new(kind, vec![diagnostic]).with_source(source);

    let sentence = Sentence::new(words.iter().map(|word| word.as_ref()));

    let tokens = lexer::tokenize(source).map_err(|d| fail(ErrorKind::Lex, d))?;
    debug!(tokens = tokens.len(); "Annotation tokenized");

    let annotation = parser::build_annotation(&tokens).map_err(|d| fail(ErrorKind::Syntax, d))?;
    debug!(statements = annotation.statements.len(); "Annotation parsed");
    trace!(annotation:?; "Syntax tree");

    let resolved =
        resolve::resolve(&annotation, &sentence).map_err(|d| fail(ErrorKind::Reference, d))?;
    debug!(aliases = resolved.aliases.len(); "Mentions resolved");

    let output = build::build(&resolved, sentence).map_err(|d| fail(ErrorKind::Build, d))?;

    if options.check_semantics {
        semantic::check(&output, &options.validator).map_err(|err| err.with_source(source))?;
        debug!("Semantic checks passed");
    }

    let parse = output.parse;
    info!(
        nodes = parse.nodes().len(),
        edges = parse.edges().len(),
        roots = parse.roots().len();
        "Graph ready"
    );
    Ok(parse)
}
