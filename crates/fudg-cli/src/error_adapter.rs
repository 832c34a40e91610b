//! miette views over [`FudgError`].
//!
//! A GFL failure may hold several diagnostics (semantic validation reports
//! every violation), and each one is rendered as its own report with a
//! snippet of the input document. I/O and configuration failures have no
//! source and become a single plain report.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceCode, SourceSpan};

use fudg::FudgError;
use fudg_parser::{
    Span,
    error::{Diagnostic, Severity},
};

/// One GFL diagnostic, read against the document it came from.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    src: &'a str,
    /// Where the annotation starts in `src`.
    offset: usize,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str, offset: usize) -> Self {
        Self { diag, src, offset }
    }

    fn source_span(&self, span: Span) -> SourceSpan {
        SourceSpan::new((self.offset + span.start()).into(), span.len())
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .field("offset", &self.offset)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = self.diag.code()?;
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = self.diag.help()?;
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.diag.labels().is_empty() {
            return None;
        }

        let labels = self.diag.labels().iter().map(|label| {
            let text = Some(label.message().to_string());
            let span = self.source_span(label.span());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(text, span)
            } else {
                LabeledSpan::new_with_span(text, span)
            }
        });
        Some(Box::new(labels))
    }
}

/// A failure outside the annotation, reported by its message alone.
pub struct ErrorAdapter<'a>(pub &'a FudgError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self.0 {
            FudgError::Io(_) => Some(Box::new("fudg::io")),
            FudgError::Config(_) => Some(Box::new("fudg::config")),
            FudgError::Parse { .. } => None,
        }
    }
}

/// Either kind of report, so the caller can render a list of them.
#[derive(Debug)]
pub enum Reportable<'a> {
    Diagnostic(DiagnosticAdapter<'a>),
    Error(ErrorAdapter<'a>),
}

impl Reportable<'_> {
    fn inner(&self) -> &dyn MietteDiagnostic {
        match self {
            Reportable::Diagnostic(d) => d,
            Reportable::Error(e) => e,
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner(), f)
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner().source()
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.inner().code()
    }

    fn severity(&self) -> Option<miette::Severity> {
        self.inner().severity()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.inner().help()
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.inner().source_code()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.inner().labels()
    }
}

/// The reports to print for `err`, in diagnostic order.
pub fn to_reportables(err: &FudgError) -> Vec<Reportable<'_>> {
    let FudgError::Parse { err: gfl, src, offset } = err else {
        return vec![Reportable::Error(ErrorAdapter(err))];
    };
    gfl.diagnostics()
        .iter()
        .map(|diag| Reportable::Diagnostic(DiagnosticAdapter::new(diag, src, *offset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use fudg_parser::error::{ErrorCode, ErrorKind, GflError};

    use super::*;

    fn gfl_failure(kind: ErrorKind, diags: Vec<Diagnostic>, src: &str) -> FudgError {
        FudgError::new_parse_error(GflError::new(kind, diags), src)
    }

    #[test]
    fn test_reference_error_keeps_code_and_help() {
        let diag = Diagnostic::error("`owl` is not a word of the sentence")
            .with_code(ErrorCode::E200)
            .with_label(Span::new(4..7), "unknown word")
            .with_help("mention a sentence token");
        let err = gfl_failure(ErrorKind::Reference, vec![diag], "hoot > owl");

        let reportables = to_reportables(&err);

        let [Reportable::Diagnostic(report)] = reportables.as_slice() else {
            panic!("one diagnostic report expected, got {reportables:?}");
        };
        assert_eq!(report.to_string(), "`owl` is not a word of the sentence");
        assert_eq!(report.code().map(|c| c.to_string()).as_deref(), Some("E200"));
        assert_eq!(report.help().map(|h| h.to_string()).as_deref(), Some("mention a sentence token"));
        assert_eq!(report.severity(), Some(miette::Severity::Error));
    }

    #[test]
    fn test_every_violation_gets_a_report() {
        let diags = vec![
            Diagnostic::error("token 1 `b` is not covered by any node").with_code(ErrorCode::E400),
            Diagnostic::error("token 2 `c` is not covered by any node").with_code(ErrorCode::E400),
            Diagnostic::error("node 0 is not reachable from any root")
                .with_code(ErrorCode::E403)
                .with_label(Span::new(0..1), "unreachable node"),
        ];
        let err = gfl_failure(ErrorKind::Semantic, diags, "a > a");

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 3);
        assert!(reportables[..2].iter().all(|r| r.labels().is_none()));
        assert_eq!(reportables[2].labels().map(Iterator::count), Some(1));
    }

    #[test]
    fn test_config_error_is_plain() {
        let err = FudgError::Config("`pretty` must be a boolean".to_string());

        let reportables = to_reportables(&err);

        let [Reportable::Error(report)] = reportables.as_slice() else {
            panic!("one plain report expected, got {reportables:?}");
        };
        assert!(report.to_string().ends_with("`pretty` must be a boolean"));
        assert_eq!(report.code().map(|c| c.to_string()).as_deref(), Some("fudg::config"));
        assert!(report.source_code().is_none());
    }

    #[test]
    fn test_secondary_labels_stay_secondary() {
        let diag = Diagnostic::error("duplicate edge `a` -> `b`")
            .with_label(Span::new(6..11), "duplicate edge")
            .with_secondary_label(Span::new(0..5), "first added here");

        let report = DiagnosticAdapter::new(&diag, "a > b\na > b", 0);
        let labels: Vec<LabeledSpan> = report.labels().into_iter().flatten().collect();

        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(labels[1].label(), Some("first added here"));
    }

    #[test]
    fn test_labels_are_shifted_past_the_sentence_line() {
        let text = "hoot owl\nhoot > owl\nhoot > owl";
        let diag = Diagnostic::error("duplicate edge `hoot` -> `owl`")
            .with_label(Span::new(11..21), "duplicate edge");
        let err = gfl_failure(ErrorKind::Build, vec![diag], "").in_document(text, 9);

        let reportables = to_reportables(&err);
        let labels: Vec<LabeledSpan> = reportables[0].labels().into_iter().flatten().collect();

        assert_eq!(labels[0].offset(), 20);
        assert_eq!(&text[20..30], "hoot > owl");
    }
}
