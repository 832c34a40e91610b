//! Lexical analyzer for GFL annotation text.
//!
//! [`Lexer`] is a lazy iterator over [`PositionedToken`]s. It stops at the
//! first error, and it checks that group brackets balance across the whole
//! text, so the parser only ever sees well-bracketed input.
//!
//! [`tokenize`] collects the iterator into a vector.

use std::borrow::Cow;

use winnow::{
    Parser as _,
    ascii::digit1,
    combinator::{alt, cut_err, not, opt, peek, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
    tokens::{PositionedToken, Selector, Token, Word},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()`; the error span runs from
/// `start` to the position where lexing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Characters that always form their own lexeme.
const RESERVED: &[char] = &['[', ']', '>', '<', '&', ':', '*', '=', ';', '"'];

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !RESERVED.contains(&c)
}

fn is_label_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn is_alias_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_alias_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split a `_N` or `@N` selector off the end of a bare word.
///
/// Only a non-empty base followed by a decimal number counts; `_0` has no
/// first occurrence to refer to, so it stays part of the word.
fn split_selector(text: &str) -> Option<(&str, Selector)> {
    let at = text.rfind(|c: char| c == '_' || c == '@')?;
    let (base, suffix) = (&text[..at], &text[at + 1..]);
    if base.is_empty() || suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let n: usize = suffix.parse().ok()?;
    match &text[at..=at] {
        "_" if n >= 1 => Some((base, Selector::Occurrence(n))),
        "@" => Some((base, Selector::Index(n))),
        _ => None,
    }
}

/// One character of quoted word content.
#[derive(Debug, Clone, Copy)]
enum QuotedChar {
    Plain(char),
    Escaped(char),
}

fn quoted_char<'a>(input: &mut Input<'a>) -> IResult<'a, QuotedChar> {
    alt((
        preceded('\\', none_of(['\n'])).map(QuotedChar::Escaped),
        none_of(['"', '\\', '\n']).map(QuotedChar::Plain),
    ))
    .parse_next(input)
}

/// Parse a `_N` or `@N` suffix directly after a quoted word.
fn quoted_selector<'a>(input: &mut Input<'a>) -> IResult<'a, Selector> {
    terminated(
        (one_of(['_', '@']), digit1).verify_map(|(marker, digits): (char, &str)| {
            let n: usize = digits.parse().ok()?;
            match marker {
                '_' if n >= 1 => Some(Selector::Occurrence(n)),
                '@' => Some(Selector::Index(n)),
                _ => None,
            }
        }),
        peek(not(one_of(is_word_char))),
    )
    .parse_next(input)
}

/// Parse a quoted word: `"New York"`, `"a\"b"`, `"x"_2`.
///
/// `\"` and `\\` are the only escapes; any other backslash is kept as is.
fn quoted_word<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let content = repeat(0.., quoted_char).fold(String::new, |mut acc, ch| {
        match ch {
            QuotedChar::Plain(c) | QuotedChar::Escaped(c @ ('"' | '\\')) => acc.push(c),
            QuotedChar::Escaped(c) => {
                acc.push('\\');
                acc.push(c);
            }
        }
        acc
    });

    let start_pos = input.current_token_start();
    let opened: IResult<'a, char> = '"'.parse_next(input);
    opened?;

    let surface = cut_err(terminated(content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated quoted word",
            help: Some("add closing `\"` before the end of the line"),
            start: start_pos,
        })
        .parse_next(input)?;
    let selector = opt(quoted_selector).parse_next(input)?;

    Ok(Token::Word(Word {
        surface: Cow::Owned(surface),
        selector,
        literal: None,
        quoted: true,
    }))
}

/// Parse a bare word, splitting off a trailing selector.
fn bare_word<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., is_word_char)
        .verify(|text: &str| {
            let mut chars = text.chars();
            match chars.next() {
                Some('$') => !chars.next().is_some_and(is_alias_start),
                _ => true,
            }
        })
        .map(|text: &'a str| match split_selector(text) {
            Some((base, selector)) => Token::Word(Word {
                surface: Cow::Borrowed(base),
                selector: Some(selector),
                literal: Some(text),
                quoted: false,
            }),
            None => Token::Word(Word::bare(text)),
        })
        .parse_next(input)
}

/// Parse an alias reference: `$subj`.
fn alias<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded(
        '$',
        terminated(
            (one_of(is_alias_start), take_while(0.., is_alias_char)).take(),
            peek(not(one_of(is_word_char))),
        ),
    )
    .map(Token::Alias)
    .parse_next(input)
}

/// Parse an edge annotation: `:nsubj`, `:conj/coord`, `:/coord`.
fn annotation<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start_pos = input.current_token_start();
    let parsed: IResult<'a, (&'a str, Option<&'a str>)> = preceded(
        ':',
        (
            take_while(0.., is_label_char),
            opt(preceded('/', take_while(0.., is_label_char))),
        ),
    )
    .parse_next(input);
    let (label, role) = parsed?;

    let empty = match role {
        Some(role) => role.is_empty(),
        None => label.is_empty(),
    };
    if empty {
        return Err(ErrMode::Cut(ContextError::new().add_context(
            input,
            &input.checkpoint(),
            LexerDiagnostic {
                code: ErrorCode::E005,
                message: "edge annotation has no label or role",
                help: Some("write `:label`, `:label/role` or `:/role`"),
                start: start_pos,
            },
        )));
    }

    Ok(Token::Annotation {
        label: (!label.is_empty()).then_some(label),
        role: role.filter(|role| !role.is_empty()),
    })
}

/// Parse a comment starting with `#`
fn comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded('#', take_while(0.., |c| c != '\n'))
        .map(Token::Comment)
        .parse_next(input)
}

/// Parse operators and punctuation (`**` before `*`)
fn operator<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        literal("**").value(Token::DoubleStar),
        '*'.value(Token::Star),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '>'.value(Token::Governs),
        '<'.value(Token::GovernedBy),
        '&'.value(Token::Ampersand),
        '='.value(Token::Equals),
        ';'.value(Token::Semicolon),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, etc. but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        comment,     // `#` only opens a comment where a lexeme starts
        quoted_word, // Must come before any single char
        alias,       // Must come before bare words, which may start with `$`
        annotation,
        operator,
        newline, // Must come before whitespace
        whitespace,
        bare_word,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lazy tokenizer over annotation text.
///
/// Yields tokens in source order. After the first error it yields that error
/// and then ends.
pub struct Lexer<'a> {
    input: Input<'a>,
    open_groups: Vec<Span>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            input: LocatingSlice::new(text),
            open_groups: Vec::new(),
            finished: false,
        }
    }

    fn fail(&mut self, diagnostic: Diagnostic) -> Option<Result<PositionedToken<'a>, Diagnostic>> {
        self.finished = true;
        Some(Err(diagnostic))
    }

    /// Track bracket nesting; a `]` with nothing open is an error.
    fn balance(&mut self, token: &PositionedToken<'a>) -> Result<(), Diagnostic> {
        match token.token {
            Token::LeftBracket => self.open_groups.push(token.span),
            Token::RightBracket => {
                if self.open_groups.pop().is_none() {
                    return Err(Diagnostic::error("`]` does not close any group")
                        .with_code(ErrorCode::E004)
                        .with_label(token.span, ErrorCode::E004.description())
                        .with_help("remove it or add a matching `[`"));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) if no diagnostic context is
    /// found.
    fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
            .with_help("alias names use only letters, digits and `_`")
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<PositionedToken<'a>, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if self.input.is_empty() {
            self.finished = true;
            let open = self.open_groups.first().copied()?;
            return Some(Err(Diagnostic::error("group is never closed")
                .with_code(ErrorCode::E003)
                .with_label(open, ErrorCode::E003.description())
                .with_help("add `]` after the last member")));
        }

        match positioned_token(&mut self.input) {
            Ok(token) => match self.balance(&token) {
                Ok(()) => Some(Ok(token)),
                Err(diagnostic) => self.fail(diagnostic),
            },
            Err(err) => {
                let error_pos = self.input.current_token_start();
                let diagnostic = Self::convert_err_mode(err, error_pos);
                self.fail(diagnostic)
            }
        }
    }
}

/// Tokenize the whole annotation, failing on the first lexical error.
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, Diagnostic> {
    Lexer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let result = positioned_token(&mut located_input);
        assert!(result.is_ok(), "Failed to parse: {}", input);
        let positioned = result.unwrap();
        assert_eq!(positioned.token, expected);
    }

    fn kinds(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .expect("should tokenize")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    fn lex_error(input: &str) -> Diagnostic {
        tokenize(input).expect_err("should fail to tokenize")
    }

    fn word(surface: &str) -> Token<'_> {
        Token::Word(Word::bare(surface))
    }

    #[test]
    fn test_operators() {
        test_single_token(">", Token::Governs);
        test_single_token("<", Token::GovernedBy);
        test_single_token("&", Token::Ampersand);
        test_single_token("=", Token::Equals);
        test_single_token(";", Token::Semicolon);
        test_single_token("*", Token::Star);
        test_single_token("**", Token::DoubleStar);
        test_single_token("[", Token::LeftBracket);
        test_single_token("]", Token::RightBracket);
    }

    #[test]
    fn test_bare_words() {
        test_single_token("cat", word("cat"));
        test_single_token("don't", word("don't"));
        test_single_token("U.S.", word("U.S."));
        test_single_token("a#b", word("a#b"));
        test_single_token("$", word("$"));
        test_single_token("$5", word("$5"));
        test_single_token("Straße", word("Straße"));
    }

    #[test]
    fn test_word_stops_at_reserved_characters() {
        assert_eq!(
            kinds("dog>cat"),
            vec![word("dog"), Token::Governs, word("cat")]
        );
        assert_eq!(
            kinds("[New York]*York"),
            vec![
                Token::LeftBracket,
                word("New"),
                Token::Whitespace,
                word("York"),
                Token::RightBracket,
                Token::Star,
                word("York"),
            ]
        );
    }

    #[test]
    fn test_occurrence_selector() {
        test_single_token(
            "the_2",
            Token::Word(Word {
                surface: Cow::Borrowed("the"),
                selector: Some(Selector::Occurrence(2)),
                literal: Some("the_2"),
                quoted: false,
            }),
        );
    }

    #[test]
    fn test_index_selector() {
        test_single_token(
            "the@3",
            Token::Word(Word {
                surface: Cow::Borrowed("the"),
                selector: Some(Selector::Index(3)),
                literal: Some("the@3"),
                quoted: false,
            }),
        );
    }

    #[test]
    fn test_non_selector_suffixes_stay_in_the_word() {
        test_single_token("x_0", word("x_0"));
        test_single_token("_3", word("_3"));
        test_single_token("snake_case", word("snake_case"));
        test_single_token("a_1b", word("a_1b"));
        test_single_token("user@example", word("user@example"));
    }

    #[test]
    fn test_selector_splits_at_last_marker() {
        test_single_token(
            "two_words_1",
            Token::Word(Word {
                surface: Cow::Borrowed("two_words"),
                selector: Some(Selector::Occurrence(1)),
                literal: Some("two_words_1"),
                quoted: false,
            }),
        );
    }

    #[test]
    fn test_quoted_words() {
        test_single_token(
            r#""a > b""#,
            Token::Word(Word {
                surface: Cow::Owned("a > b".to_string()),
                selector: None,
                literal: None,
                quoted: true,
            }),
        );
        test_single_token(
            r#""say \"hi\" \\ \n""#,
            Token::Word(Word {
                surface: Cow::Owned(r#"say "hi" \ \n"#.to_string()),
                selector: None,
                literal: None,
                quoted: true,
            }),
        );
        test_single_token(
            r#"":"_2"#,
            Token::Word(Word {
                surface: Cow::Owned(":".to_string()),
                selector: Some(Selector::Occurrence(2)),
                literal: None,
                quoted: true,
            }),
        );
    }

    #[test]
    fn test_alias() {
        test_single_token("$subj", Token::Alias("subj"));
        test_single_token("$_x1", Token::Alias("_x1"));
        assert_eq!(
            kinds("$a=b"),
            vec![Token::Alias("a"), Token::Equals, word("b")]
        );
    }

    #[test]
    fn test_annotations() {
        test_single_token(
            ":nsubj",
            Token::Annotation {
                label: Some("nsubj"),
                role: None,
            },
        );
        test_single_token(
            ":conj/coord",
            Token::Annotation {
                label: Some("conj"),
                role: Some("coord"),
            },
        );
        test_single_token(
            ":/coord",
            Token::Annotation {
                label: None,
                role: Some("coord"),
            },
        );
        test_single_token(
            ":obl.tmod",
            Token::Annotation {
                label: Some("obl.tmod"),
                role: None,
            },
        );
    }

    #[test]
    fn test_comments_and_separators() {
        assert_eq!(
            kinds("a > b # note\n;c"),
            vec![
                word("a"),
                Token::Whitespace,
                Token::Governs,
                Token::Whitespace,
                word("b"),
                Token::Whitespace,
                Token::Comment(" note"),
                Token::Newline,
                Token::Semicolon,
                word("c"),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("ab > cd").unwrap();

        let spans: Vec<_> = tokens.iter().map(|t| t.span).collect();
        assert_eq!(
            spans,
            vec![
                Span::new(0..2),
                Span::new(2..3),
                Span::new(3..4),
                Span::new(4..5),
                Span::new(5..7),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_quoted_word() {
        let diag = lex_error("a > \"b c");

        assert_eq!(diag.code(), Some(ErrorCode::E001));
        assert_eq!(diag.labels()[0].span(), Span::new(4..8));
    }

    #[test]
    fn test_quoted_word_ends_at_newline() {
        let diag = lex_error("\"a\nb\"");
        assert_eq!(diag.code(), Some(ErrorCode::E001));
    }

    #[test]
    fn test_unclosed_bracket() {
        let diag = lex_error("[New York > x");

        assert_eq!(diag.code(), Some(ErrorCode::E003));
        assert_eq!(diag.labels()[0].span(), Span::new(0..1));
    }

    #[test]
    fn test_unmatched_closing_bracket() {
        let diag = lex_error("a ] > b");

        assert_eq!(diag.code(), Some(ErrorCode::E004));
        assert_eq!(diag.labels()[0].span(), Span::new(2..3));
    }

    #[test]
    fn test_empty_annotation() {
        assert_eq!(lex_error("a > b :").code(), Some(ErrorCode::E005));
        assert_eq!(lex_error("a > b :/").code(), Some(ErrorCode::E005));
        assert_eq!(lex_error("a > b :x/ ").code(), Some(ErrorCode::E005));
    }

    #[test]
    fn test_bad_alias_name() {
        let diag = lex_error("$a-b = c");
        assert_eq!(diag.code(), Some(ErrorCode::E002));
    }

    #[test]
    fn test_lexer_stops_after_first_error() {
        let mut lexer = Lexer::new("a ] ]");

        assert!(matches!(lexer.next(), Some(Ok(_))));
        assert!(matches!(lexer.next(), Some(Ok(_))));
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }
}
