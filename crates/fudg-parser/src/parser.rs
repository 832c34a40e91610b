//! Parser for GFL tokens.
//!
//! This module turns the token stream from the [`lexer`](super::lexer) into
//! the syntax tree of [`parser_types`](super::parser_types). The public entry
//! point is [`build_annotation`].
//!
//! ## Grammar
//!
//! ```text
//! annotation := sep* (statement (sep+ statement)*)? sep*
//! statement  := alias-decl | edge-chain
//! alias-decl := ALIAS '=' NL* operand
//! edge-chain := operand (('>' | '<') NL* operand ANNOTATION?)*
//! operand    := primary ('&' NL* primary)*
//! primary    := (WORD | group | ALIAS) '**'?
//! group      := '[' WORD+ ']' ('*' WORD)?
//! ```
//!
//! `sep` is `;` or a newline. A newline right after `>`, `<`, `&` or `=`
//! continues the statement.

use winnow::{
    Parser as _,
    combinator::repeat,
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    build::COORDINATION_ROLE,
    error::{Diagnostic, ErrorCode},
    parser_types::{self as types, Direction, Group, Link, Operand, Primary, PrimaryTarget},
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what the parser expected at the failing token
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) where the failing statement starts
    StartOffset(usize),
    /// A specific syntax problem with its own code and location
    Problem {
        code: ErrorCode,
        message: &'static str,
        span: Span,
    },
}

type Input<'src> = GflTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type GflTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

const PRIMARY: &str = "a word, a `[` group or an `$alias`";

/// Backtrack error describing what was expected at the current token
fn expected(label: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    ErrMode::Backtrack(e)
}

/// Cut error for a construct that is recognized but not allowed
fn problem(code: ErrorCode, message: &'static str, span: Span) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Problem {
        code,
        message,
        span,
    });
    ErrMode::Cut(e)
}

/// Run `f` as one statement, recording where the statement began.
fn in_statement<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

fn peek_is<'src>(input: &Input<'src>, pred: impl FnOnce(&Token<'src>) -> bool) -> bool {
    input.peek_token().is_some_and(|token| pred(&token.token))
}

/// Parse whitespace and comments
fn trivia<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.token.is_trivia())
        .void()
        .parse_next(input)
}

/// Parse zero or more whitespace/comments
fn ws0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., trivia).parse_next(input)
}

/// Skip trivia and newlines inside a statement that is being continued
fn line_breaks0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| {
            token.token.is_trivia() || matches!(token.token, Token::Newline)
        })
        .void(),
    )
    .parse_next(input)
}

/// Skip everything that may sit between statements
fn separators<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| {
            token.token.is_trivia() || token.token.is_separator()
        })
        .void(),
    )
    .parse_next(input)
}

/// Parse a group: `[New York]` or `[New York]*York`
///
/// Newlines inside the brackets are ignored.
fn group<'src>(input: &mut Input<'src>) -> IResult<(Group<'src>, Span)> {
    let Some(open) = input.next_token() else {
        return Err(expected("`[`"));
    };

    let mut members = Vec::new();
    let close = loop {
        let Some(token) = input.peek_token() else {
            return Err(expected("a group member or `]`"));
        };
        match &token.token {
            Token::Word(word) => {
                input.next_token();
                members.push(Spanned::new(word.clone(), token.span));
            }
            Token::RightBracket => {
                input.next_token();
                break token.span;
            }
            Token::LeftBracket => {
                return Err(problem(
                    ErrorCode::E102,
                    "groups cannot be nested",
                    token.span,
                ));
            }
            Token::Newline => {
                input.next_token();
            }
            other if other.is_trivia() => {
                input.next_token();
            }
            _ => return Err(expected("a group member or `]`")),
        }
    };

    let mut span = open.span.union(close);
    if members.is_empty() {
        return Err(problem(ErrorCode::E103, "group has no members", span));
    }

    let checkpoint = input.checkpoint();
    ws0(input)?;
    let head = if peek_is(input, |token| matches!(token, Token::Star)) {
        input.next_token();
        ws0(input)?;
        match input.peek_token() {
            Some(PositionedToken {
                token: Token::Word(word),
                span: head_span,
            }) => {
                input.next_token();
                span = span.union(*head_span);
                Some(Spanned::new(word.clone(), *head_span))
            }
            _ => return Err(expected("the head word after `*`")),
        }
    } else {
        input.reset(&checkpoint);
        None
    };

    Ok((Group { members, head }, span))
}

/// Parse a word, group, or alias reference with an optional `**`
fn primary<'src>(input: &mut Input<'src>) -> IResult<Primary<'src>> {
    ws0(input)?;
    let Some(first) = input.peek_token() else {
        return Err(expected(PRIMARY));
    };

    let (target, mut span) = match &first.token {
        Token::Word(word) => {
            input.next_token();
            (PrimaryTarget::Word(word.clone()), first.span)
        }
        Token::Alias(name) => {
            input.next_token();
            (PrimaryTarget::Alias(*name), first.span)
        }
        Token::LeftBracket => {
            let (group, span) = group(input)?;
            (PrimaryTarget::Group(group), span)
        }
        _ => return Err(expected(PRIMARY)),
    };

    let checkpoint = input.checkpoint();
    ws0(input)?;
    let root = match input.peek_token() {
        Some(PositionedToken {
            token: Token::DoubleStar,
            span: marker,
        }) => {
            input.next_token();
            span = span.union(*marker);
            true
        }
        _ => {
            input.reset(&checkpoint);
            false
        }
    };

    Ok(Primary { target, root, span })
}

/// Parse primaries joined by `&`
fn operand<'src>(input: &mut Input<'src>) -> IResult<Operand<'src>> {
    let first = primary(input)?;
    let mut span = first.span;
    let mut primaries = vec![first];

    loop {
        let checkpoint = input.checkpoint();
        ws0(input)?;
        if !peek_is(input, |token| matches!(token, Token::Ampersand)) {
            input.reset(&checkpoint);
            break;
        }
        input.next_token();
        line_breaks0(input)?;

        let next = primary(input)?;
        span = span.union(next.span);
        primaries.push(next);
    }

    Ok(Operand { primaries, span })
}

/// Parse an alias declaration: `$subj = [the dog]`
///
/// Returns `None`, consuming nothing, when the statement is not a
/// declaration. A statement starting with an alias reference is an edge
/// chain unless `=` follows.
fn alias_declaration<'src>(
    input: &mut Input<'src>,
) -> IResult<Option<Spanned<types::Statement<'src>>>> {
    let checkpoint = input.checkpoint();
    let Some(PositionedToken {
        token: Token::Alias(name),
        span: name_span,
    }) = input.peek_token()
    else {
        return Ok(None);
    };
    input.next_token();

    ws0(input)?;
    if !peek_is(input, |token| matches!(token, Token::Equals)) {
        input.reset(&checkpoint);
        return Ok(None);
    }
    input.next_token();
    line_breaks0(input)?;

    let value = operand(input)?;
    let span = name_span.union(value.span);
    Ok(Some(Spanned::new(
        types::Statement::Alias {
            name: Spanned::new(*name, *name_span),
            value,
        },
        span,
    )))
}

/// `coord` is reserved for links that involve a coordination, which carry
/// no other role.
fn check_role(role: Option<&str>, coordinated: bool, span: Span) -> IResult<()> {
    match role {
        Some(role) if coordinated && role != COORDINATION_ROLE => Err(problem(
            ErrorCode::E104,
            "a link to or from a coordination always has role `coord`",
            span,
        )),
        Some(COORDINATION_ROLE) if !coordinated => Err(problem(
            ErrorCode::E105,
            "role `coord` is reserved for links involving `&`",
            span,
        )),
        _ => Ok(()),
    }
}

/// Parse an edge chain: `a > b :label < c`
fn edge_chain<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::Statement<'src>>> {
    let first = operand(input)?;
    let mut span = first.span;
    let mut links = Vec::new();
    let mut left_is_coordination = first.is_coordination();

    loop {
        let checkpoint = input.checkpoint();
        ws0(input)?;
        let Some(operator) = input.peek_token() else {
            break;
        };
        let direction = match operator.token {
            Token::Governs => Direction::Governs,
            Token::GovernedBy => Direction::GovernedBy,
            _ => {
                input.reset(&checkpoint);
                break;
            }
        };
        input.next_token();
        line_breaks0(input)?;

        let right = operand(input)?;
        let mut link_span = operator.span.union(right.span);

        let checkpoint = input.checkpoint();
        ws0(input)?;
        let (label, role) = match input.peek_token() {
            Some(PositionedToken {
                token: Token::Annotation { label, role },
                span: annotation_span,
            }) => {
                input.next_token();
                link_span = link_span.union(*annotation_span);
                let coordinated = left_is_coordination || right.is_coordination();
                check_role(*role, coordinated, *annotation_span)?;
                (*label, *role)
            }
            _ => {
                input.reset(&checkpoint);
                (None, None)
            }
        };

        span = span.union(link_span);
        left_is_coordination = right.is_coordination();
        links.push(Link {
            direction,
            operand: right,
            label,
            role,
            span: link_span,
        });
    }

    Ok(Spanned::new(types::Statement::Chain { first, links }, span))
}

fn statement<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::Statement<'src>>> {
    ws0(input)?;
    if let Some(declaration) = alias_declaration(input)? {
        return Ok(declaration);
    }
    edge_chain(input)
}

/// Require a separator or the end of input after a statement
fn end_of_statement<'src>(input: &mut Input<'src>) -> IResult<()> {
    ws0(input)?;
    match input.peek_token() {
        None => Ok(()),
        Some(token) if token.token.is_separator() => Ok(()),
        Some(PositionedToken {
            token: Token::Annotation { .. },
            ..
        }) => Err(expected("a `>` or `<` link before the edge annotation")),
        Some(_) => Err(expected("`>`, `<`, `&` or the end of the statement")),
    }
}

fn annotation<'src>(input: &mut Input<'src>) -> IResult<types::Annotation<'src>> {
    let mut statements = Vec::new();

    loop {
        separators(input)?;
        if input.eof_offset() == 0 {
            break;
        }
        let parsed = in_statement(input, |input| {
            let parsed = statement(input)?;
            end_of_statement(input)?;
            Ok(parsed)
        })?;
        statements.push(parsed);
    }

    Ok(types::Annotation { statements })
}

/// Reconstruct the text of the statement starting at token `start`.
///
/// Stops at the first separator that is not a continuation.
fn statement_text(tokens: &[PositionedToken<'_>], start: usize) -> Option<(Span, String)> {
    let mut text = String::new();
    let mut span: Option<Span> = None;
    let mut depth = 0usize;
    let mut continues = false;

    for token in tokens.get(start..)? {
        match &token.token {
            Token::Semicolon => break,
            Token::Newline if depth == 0 && !continues => break,
            Token::Newline | Token::Whitespace => {
                if !text.ends_with(' ') {
                    text.push(' ');
                }
                continue;
            }
            Token::Comment(_) => continue,
            Token::LeftBracket => depth += 1,
            Token::RightBracket => depth = depth.saturating_sub(1),
            _ => {}
        }
        continues = matches!(
            token.token,
            Token::Governs | Token::GovernedBy | Token::Ampersand | Token::Equals
        );
        text.push_str(&token.token.to_string());
        span = Some(span.map_or(token.span, |span| span.union(token.span)));
    }

    let text = text.trim();
    span.map(|span| (span, text.to_string()))
}

fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let error = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        // Token slices are never partial input.
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let statement_start = error.context().find_map(|ctx| match ctx {
        Context::StartOffset(n) => Some(tokens.len() - *n),
        _ => None,
    });
    let problem = error.context().find_map(|ctx| match ctx {
        Context::Problem {
            code,
            message,
            span,
        } => Some((*code, *message, *span)),
        _ => None,
    });
    let expected = error
        .context()
        .find_map(|ctx| match ctx {
            Context::Label(label) => Some(*label),
            _ => None,
        })
        .unwrap_or("a statement");

    let error_index = tokens.len() - current_remaining;
    let mut diagnostic = match (problem, tokens.get(error_index)) {
        (Some((code, message, span)), _) => Diagnostic::error(message)
            .with_code(code)
            .with_label(span, code.description()),
        (None, Some(found)) => Diagnostic::error(format!(
            "expected {expected}, found {}",
            found.token.describe()
        ))
        .with_code(ErrorCode::E100)
        .with_label(found.span, format!("expected {expected}")),
        (None, None) => {
            let end = tokens.last().map_or(0, |token| token.span.end());
            Diagnostic::error(format!("expected {expected}, found end of input"))
                .with_code(ErrorCode::E101)
                .with_label(Span::new(end..end), "annotation ends here")
                .with_help("finish the statement or remove the trailing operator")
        }
    };

    if let Some((span, text)) = statement_start.and_then(|start| statement_text(tokens, start)) {
        diagnostic = diagnostic.with_secondary_label(span, format!("in statement `{text}`"));
    }
    diagnostic
}

/// Build the syntax tree of an annotation from its tokens
pub fn build_annotation<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<types::Annotation<'src>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    match annotation(&mut token_slice) {
        Ok(annotation) => Ok(annotation),
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(convert_error(e, tokens, current_remaining))
        }
    }
}
