//! Token types produced by the [`lexer`](super::lexer).

use std::{borrow::Cow, fmt};

use crate::span::Span;

/// A suffix that picks one token out of several with the same surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `word_N`: the N-th occurrence, counting from 1.
    Occurrence(usize),
    /// `word@N`: the token at 0-based sentence position N.
    Index(usize),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Occurrence(n) => write!(f, "_{n}"),
            Selector::Index(n) => write!(f, "@{n}"),
        }
    }
}

/// A mention of a sentence token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word<'src> {
    /// The surface form to look up, with quotes and escapes removed.
    pub surface: Cow<'src, str>,
    pub selector: Option<Selector>,
    /// The unsplit text of a bare word that carried a selector.
    ///
    /// A sentence may contain `x_2` as an actual token; the resolver falls
    /// back to this text when the base word does not occur.
    pub literal: Option<&'src str>,
    pub quoted: bool,
}

impl<'src> Word<'src> {
    /// A bare word without selector.
    pub fn bare(surface: &'src str) -> Self {
        Self {
            surface: Cow::Borrowed(surface),
            selector: None,
            literal: None,
            quoted: false,
        }
    }
}

impl fmt::Display for Word<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            f.write_str("\"")?;
            for ch in self.surface.chars() {
                if matches!(ch, '"' | '\\') {
                    f.write_str("\\")?;
                }
                write!(f, "{ch}")?;
            }
            f.write_str("\"")?;
        } else {
            f.write_str(&self.surface)?;
        }
        if let Some(selector) = self.selector {
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

/// Tokens of the GFL annotation language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    Word(Word<'src>),
    /// `$name`, stored without the `$`.
    Alias(&'src str),
    /// `:label`, `:label/role` or `:/role`. At least one part is present.
    Annotation {
        label: Option<&'src str>,
        role: Option<&'src str>,
    },

    LeftBracket,
    RightBracket,
    /// `>`
    Governs,
    /// `<`
    GovernedBy,
    /// `&`
    Ampersand,
    /// `*`
    Star,
    /// `**`
    DoubleStar,
    /// `=`
    Equals,
    Semicolon,

    Newline,
    Whitespace,
    Comment(&'src str),
}

impl Token<'_> {
    /// Whether the token ends a statement.
    pub fn is_separator(&self) -> bool {
        matches!(self, Token::Semicolon | Token::Newline)
    }

    /// Whether the parser skips the token inside a statement.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Comment(_))
    }

    /// The token as it should appear in "found ..." messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Newline => "end of line".to_string(),
            Token::Whitespace => "whitespace".to_string(),
            Token::Comment(_) => "comment".to_string(),
            token => format!("`{token}`"),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => write!(f, "{word}"),
            Token::Alias(name) => write!(f, "${name}"),
            Token::Annotation { label, role } => {
                write!(f, ":{}", label.unwrap_or_default())?;
                if let Some(role) = role {
                    write!(f, "/{role}")?;
                }
                Ok(())
            }
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Governs => write!(f, ">"),
            Token::GovernedBy => write!(f, "<"),
            Token::Ampersand => write!(f, "&"),
            Token::Star => write!(f, "*"),
            Token::DoubleStar => write!(f, "**"),
            Token::Equals => write!(f, "="),
            Token::Semicolon => write!(f, ";"),
            Token::Newline => writeln!(f),
            Token::Whitespace => write!(f, " "),
            Token::Comment(text) => write!(f, "#{text}"),
        }
    }
}

/// A token with its location in the annotation source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_display_keeps_selector() {
        let word = Word {
            surface: Cow::Borrowed("the"),
            selector: Some(Selector::Occurrence(2)),
            literal: Some("the_2"),
            quoted: false,
        };
        assert_eq!(word.to_string(), "the_2");
    }

    #[test]
    fn test_quoted_word_display_escapes() {
        let word = Word {
            surface: Cow::Owned("say \"hi\"".to_string()),
            selector: Some(Selector::Index(3)),
            literal: None,
            quoted: true,
        };
        assert_eq!(word.to_string(), r#""say \"hi\""@3"#);
    }

    #[test]
    fn test_annotation_display() {
        let token = Token::Annotation {
            label: Some("nsubj"),
            role: Some("arg"),
        };
        assert_eq!(token.to_string(), ":nsubj/arg");

        let token = Token::Annotation {
            label: None,
            role: Some("coord"),
        };
        assert_eq!(token.to_string(), ":/coord");
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::Newline.describe(), "end of line");
        assert_eq!(Token::Governs.describe(), "`>`");
        assert_eq!(Token::Alias("x").describe(), "`$x`");
    }
}
