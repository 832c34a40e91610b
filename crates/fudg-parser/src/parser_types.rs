//! Syntax tree produced by the [`parser`](super::parser).
//!
//! Mentions are still surface text here; the
//! [`resolve`](super::resolve) stage maps them onto sentence tokens.

use std::fmt;

use crate::{
    span::{Span, Spanned},
    tokens::Word,
};

/// A whole annotation: its statements in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation<'src> {
    pub statements: Vec<Spanned<Statement<'src>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'src> {
    /// `a > b < c ...`; a single operand with no links is also a chain.
    Chain {
        first: Operand<'src>,
        links: Vec<Link<'src>>,
    },
    /// `$name = operand`
    Alias {
        name: Spanned<&'src str>,
        value: Operand<'src>,
    },
}

/// Which side of a link governs the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `>`: the left operand governs the right one.
    Governs,
    /// `<`: the right operand governs the left one.
    GovernedBy,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Governs => write!(f, ">"),
            Direction::GovernedBy => write!(f, "<"),
        }
    }
}

/// One step of an edge chain: the operator, the operand to its right, and
/// the optional annotation that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<'src> {
    pub direction: Direction,
    pub operand: Operand<'src>,
    pub label: Option<&'src str>,
    pub role: Option<&'src str>,
    /// From the operator to the end of the operand or annotation.
    pub span: Span,
}

/// One or more primaries joined by `&`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand<'src> {
    pub primaries: Vec<Primary<'src>>,
    pub span: Span,
}

impl Operand<'_> {
    pub fn is_coordination(&self) -> bool {
        self.primaries.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primary<'src> {
    pub target: PrimaryTarget<'src>,
    /// Marked with `**`.
    pub root: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryTarget<'src> {
    Word(Word<'src>),
    Group(Group<'src>),
    Alias(&'src str),
}

/// `[w1 w2 ...]` with an optional `*head`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'src> {
    pub members: Vec<Spanned<Word<'src>>>,
    pub head: Option<Spanned<Word<'src>>>,
}
