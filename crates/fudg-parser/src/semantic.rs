//! Turns validator violations into diagnostics pointing at the annotation.

use log::debug;

use fudg_core::validate::{Validator, Violation};

use crate::{
    build::BuildOutput,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ErrorKind, GflError},
    span::Span,
};

fn code(violation: &Violation) -> ErrorCode {
    match violation {
        Violation::UncoveredToken { .. } => ErrorCode::E400,
        Violation::MultiplyCoveredToken { .. } => ErrorCode::E401,
        Violation::OverlappingGroups { .. } => ErrorCode::E402,
        Violation::Unreachable { .. } => ErrorCode::E403,
        Violation::DuplicateEdge { .. } => ErrorCode::E404,
        Violation::Custom { .. } => ErrorCode::E405,
    }
}

fn diagnostic(violation: &Violation, node_spans: &[Span]) -> Diagnostic {
    let code = code(violation);
    let mut diagnostic = Diagnostic::error(violation.to_string()).with_code(code);

    let mut spans = violation
        .nodes()
        .into_iter()
        .filter_map(|node| node_spans.get(node.get()).copied());
    if let Some(primary) = spans.next() {
        diagnostic = diagnostic.with_label(primary, code.description());
    }
    for secondary in spans {
        diagnostic = diagnostic.with_secondary_label(secondary, "also involved");
    }

    match violation {
        Violation::UncoveredToken { surface, .. } => {
            diagnostic.with_help(format!("mention `{surface}` in a statement"))
        }
        Violation::Unreachable { .. } => {
            diagnostic.with_help("mark one node of the cycle as a root with `**`")
        }
        _ => diagnostic,
    }
}

/// Run `validator` over a built graph, reporting every violation at once.
pub fn check(output: &BuildOutput, validator: &Validator) -> Result<(), GflError> {
    let Err(violations) = validator.validate(&output.parse) else {
        return Ok(());
    };
    debug!(violations = violations.len(); "Semantic check failed");

    let mut collector = DiagnosticCollector::new();
    for violation in &violations {
        collector.emit(diagnostic(violation, &output.node_spans));
    }
    collector.finish(ErrorKind::Semantic)
}
