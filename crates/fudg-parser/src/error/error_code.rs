//! Error codes for the GFL diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Reference resolution errors
//! - `E3xx` - Graph building errors
//! - `E4xx` - Semantic validation errors

use std::fmt;

use crate::error::{BuildErrorKind, ErrorKind};

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated quoted word.
    ///
    /// A word was opened with `"` but the text ended before the closing quote.
    E001,

    /// Unexpected character.
    E002,

    /// Unclosed group bracket.
    ///
    /// A `[` has no matching `]` anywhere after it.
    E003,

    /// Unmatched closing bracket.
    E004,

    /// Empty edge annotation.
    ///
    /// A `:` was not followed by a label or a `/role`.
    E005,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Incomplete input.
    ///
    /// The annotation ended in the middle of a statement, such as after `>`.
    E101,

    /// Nested group.
    E102,

    /// Empty group.
    E103,

    /// Role conflicts with coordination.
    ///
    /// A link involving `&` carries the `coord` role and cannot name another
    /// one.
    E104,

    /// Reserved role on a plain link.
    ///
    /// `coord` marks coordinated links only.
    E105,

    // =========================================================================
    // Reference Errors (E2xx)
    // =========================================================================
    /// Unknown word.
    ///
    /// The mention matches no token of the sentence.
    E200,

    /// Ambiguous word.
    ///
    /// The surface occurs more than once; a `_N` or `@N` selector is needed.
    E201,

    /// Occurrence selector out of range.
    E202,

    /// Index selector does not match.
    ///
    /// `word@N` names a position past the end of the sentence, or one whose
    /// token has a different surface.
    E203,

    /// Overlapping group.
    E204,

    /// Group head is not a member.
    E205,

    /// Duplicate group member.
    E206,

    /// Duplicate alias declaration.
    E207,

    // =========================================================================
    // Build Errors (E3xx)
    // =========================================================================
    /// Duplicate edge.
    E300,

    /// Conflicting group.
    ///
    /// A group was declared over a token that is already a standalone node, or
    /// redeclared with a different head.
    E301,

    /// Unknown node reference.
    ///
    /// An alias was used before any declaration bound it.
    E302,

    // =========================================================================
    // Semantic Errors (E4xx)
    // =========================================================================
    /// Token not covered by any node.
    E400,

    /// Token covered by several nodes.
    E401,

    /// Groups share tokens.
    E402,

    /// Node not reachable from a root.
    E403,

    /// Edge declared more than once.
    E404,

    /// Violation reported by a custom rule.
    E405,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            // Reference errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
            // Build errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            // Semantic errors
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
            ErrorCode::E402 => "E402",
            ErrorCode::E403 => "E403",
            ErrorCode::E404 => "E404",
            ErrorCode::E405 => "E405",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "unterminated quoted word",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "unclosed bracket",
            ErrorCode::E004 => "unmatched closing bracket",
            ErrorCode::E005 => "empty edge annotation",
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "nested group",
            ErrorCode::E103 => "empty group",
            ErrorCode::E104 => "role on a coordinated link",
            ErrorCode::E105 => "reserved role",
            // Reference errors
            ErrorCode::E200 => "unknown word",
            ErrorCode::E201 => "ambiguous word",
            ErrorCode::E202 => "occurrence out of range",
            ErrorCode::E203 => "index selector mismatch",
            ErrorCode::E204 => "overlapping group",
            ErrorCode::E205 => "head is not a group member",
            ErrorCode::E206 => "duplicate group member",
            ErrorCode::E207 => "duplicate alias",
            // Build errors
            ErrorCode::E300 => "duplicate edge",
            ErrorCode::E301 => "conflicting group",
            ErrorCode::E302 => "unknown node reference",
            // Semantic errors
            ErrorCode::E400 => "uncovered token",
            ErrorCode::E401 => "multiply covered token",
            ErrorCode::E402 => "overlapping groups",
            ErrorCode::E403 => "unreachable node",
            ErrorCode::E404 => "duplicate edge",
            ErrorCode::E405 => "custom rule violation",
        }
    }

    /// The pipeline stage that reports this code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E001
            | ErrorCode::E002
            | ErrorCode::E003
            | ErrorCode::E004
            | ErrorCode::E005 => ErrorKind::Lex,
            ErrorCode::E100
            | ErrorCode::E101
            | ErrorCode::E102
            | ErrorCode::E103
            | ErrorCode::E104
            | ErrorCode::E105 => ErrorKind::Syntax,
            ErrorCode::E200
            | ErrorCode::E201
            | ErrorCode::E202
            | ErrorCode::E203
            | ErrorCode::E204
            | ErrorCode::E205
            | ErrorCode::E206
            | ErrorCode::E207 => ErrorKind::Reference,
            ErrorCode::E300 | ErrorCode::E301 | ErrorCode::E302 => ErrorKind::Build,
            ErrorCode::E400
            | ErrorCode::E401
            | ErrorCode::E402
            | ErrorCode::E403
            | ErrorCode::E404
            | ErrorCode::E405 => ErrorKind::Semantic,
        }
    }

    /// The build failure this code stands for, if it is a build code.
    pub fn build_kind(&self) -> Option<BuildErrorKind> {
        match self {
            ErrorCode::E300 => Some(BuildErrorKind::DuplicateEdge),
            ErrorCode::E301 => Some(BuildErrorKind::ConflictingGroup),
            ErrorCode::E302 => Some(BuildErrorKind::UnknownNodeReference),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E103.to_string(), "E103");
        assert_eq!(ErrorCode::E207.to_string(), "E207");
        assert_eq!(ErrorCode::E405.to_string(), "E405");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated quoted word");
        assert_eq!(ErrorCode::E201.description(), "ambiguous word");
        assert_eq!(ErrorCode::E300.description(), "duplicate edge");
    }

    #[test]
    fn test_error_code_kind() {
        assert_eq!(ErrorCode::E004.kind(), ErrorKind::Lex);
        assert_eq!(ErrorCode::E101.kind(), ErrorKind::Syntax);
        assert_eq!(ErrorCode::E204.kind(), ErrorKind::Reference);
        assert_eq!(ErrorCode::E302.kind(), ErrorKind::Build);
        assert_eq!(ErrorCode::E403.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_build_kind() {
        assert_eq!(
            ErrorCode::E301.build_kind(),
            Some(BuildErrorKind::ConflictingGroup)
        );
        assert_eq!(ErrorCode::E404.build_kind(), None);
    }
}
