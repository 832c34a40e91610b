//! Reference resolution: maps word mentions onto sentence tokens.
//!
//! A bare mention must match exactly one token. Repeated surfaces need a
//! selector: `the_2` picks the second occurrence, `the@3` the token at
//! position 3. Groups are checked here as well: their members must be
//! distinct, the head must be a member, and a group may only share tokens
//! with an earlier group if both have the same members.

use indexmap::IndexMap;
use log::trace;

use fudg_core::{graph::Sentence, identifier::TokenIndex};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    parser_types::{self as types, Direction, Group, Operand, Primary, PrimaryTarget},
    span::{Span, Spanned},
    tokens::{Selector, Word},
};

/// Interned alias name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AliasId(usize);

impl AliasId {
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnnotation {
    pub statements: Vec<Spanned<ResolvedStatement>>,
    /// Alias names, indexed by [`AliasId`].
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedStatement {
    Chain {
        first: ROperand,
        links: Vec<RLink>,
    },
    Alias {
        alias: AliasId,
        value: ROperand,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RLink {
    pub direction: Direction,
    pub operand: ROperand,
    pub label: Option<String>,
    pub role: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ROperand {
    pub primaries: Vec<RPrimary>,
    pub span: Span,
}

impl ROperand {
    pub fn is_coordination(&self) -> bool {
        self.primaries.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RPrimary {
    pub target: Target,
    pub root: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Token(TokenIndex),
    Group(ResolvedGroup),
    Alias(AliasId),
}

/// A group with its members in sentence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    pub members: Vec<TokenIndex>,
    pub head: Option<TokenIndex>,
}

struct Resolver<'a> {
    sentence: &'a Sentence,
    /// Member sets of the groups declared so far, with their first span.
    groups: Vec<(Vec<TokenIndex>, Span)>,
    /// Alias names with the span of their declaration, once seen.
    aliases: IndexMap<String, Option<Span>>,
}

impl<'a> Resolver<'a> {
    fn new(sentence: &'a Sentence) -> Self {
        Self {
            sentence,
            groups: Vec::new(),
            aliases: IndexMap::new(),
        }
    }

    fn occurrences_of(&self, surface: &str) -> Vec<TokenIndex> {
        self.sentence.occurrences(surface).collect()
    }

    fn statement(&mut self, statement: &types::Statement<'_>) -> Result<ResolvedStatement> {
        match statement {
            types::Statement::Chain { first, links } => {
                let first = self.operand(first)?;
                let links = links
                    .iter()
                    .map(|link| {
                        Ok(RLink {
                            direction: link.direction,
                            operand: self.operand(&link.operand)?,
                            label: link.label.map(str::to_string),
                            role: link.role.map(str::to_string),
                            span: link.span,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ResolvedStatement::Chain { first, links })
            }
            types::Statement::Alias { name, value } => {
                let alias = self.declare_alias(name)?;
                let value = self.operand(value)?;
                Ok(ResolvedStatement::Alias { alias, value })
            }
        }
    }

    fn operand(&mut self, operand: &Operand<'_>) -> Result<ROperand> {
        let primaries = operand
            .primaries
            .iter()
            .map(|primary| self.primary(primary))
            .collect::<Result<Vec<_>>>()?;
        Ok(ROperand {
            primaries,
            span: operand.span,
        })
    }

    fn primary(&mut self, primary: &Primary<'_>) -> Result<RPrimary> {
        let target = match &primary.target {
            PrimaryTarget::Word(word) => Target::Token(self.mention(word, primary.span)?),
            PrimaryTarget::Group(group) => Target::Group(self.group(group, primary.span)?),
            PrimaryTarget::Alias(name) => Target::Alias(self.reference_alias(name)),
        };
        Ok(RPrimary {
            target,
            root: primary.root,
            span: primary.span,
        })
    }

    /// Resolve one word mention to a token index.
    fn mention(&self, word: &Word<'_>, span: Span) -> Result<TokenIndex> {
        let found = self.occurrences_of(&word.surface);

        let Some(selector) = word.selector else {
            return self.unique(word, &found, span);
        };

        if found.is_empty() {
            if let Some(literal) = word.literal {
                let literal_found = self.occurrences_of(literal);
                if !literal_found.is_empty() {
                    trace!(literal; "Selector suffix is part of the token");
                    return self.unique(&Word::bare(literal), &literal_found, span);
                }
            }
        }

        let index = match selector {
            Selector::Occurrence(n) => {
                if found.is_empty() {
                    return Err(unknown_word(word, span));
                }
                *found.get(n - 1).ok_or_else(|| {
                    Diagnostic::error(format!(
                        "`{word}` selects occurrence {n}, but `{}` occurs {} time{} in the sentence",
                        word.surface,
                        found.len(),
                        if found.len() == 1 { "" } else { "s" },
                    ))
                    .with_code(ErrorCode::E202)
                    .with_label(span, ErrorCode::E202.description())
                })?
            }
            Selector::Index(i) => {
                let index = TokenIndex::new(i);
                match self.sentence.get(index) {
                    Some(token) if token.surface() == word.surface => index,
                    Some(token) => {
                        return Err(Diagnostic::error(format!(
                            "token {i} is `{}`, not `{}`",
                            token.surface(),
                            word.surface
                        ))
                        .with_code(ErrorCode::E203)
                        .with_label(span, ErrorCode::E203.description())
                        .with_help(occurrence_help(word, &found)));
                    }
                    None => {
                        return Err(Diagnostic::error(format!(
                            "`{word}` points past the end of the sentence, which has {} tokens",
                            self.sentence.len()
                        ))
                        .with_code(ErrorCode::E203)
                        .with_label(span, ErrorCode::E203.description()));
                    }
                }
            }
        };

        trace!(mention:% = word, index = index.get(); "Resolved mention");
        Ok(index)
    }

    /// A mention without selector: the surface must occur exactly once.
    fn unique(&self, word: &Word<'_>, found: &[TokenIndex], span: Span) -> Result<TokenIndex> {
        match found {
            [index] => {
                trace!(mention:% = word, index = index.get(); "Resolved mention");
                Ok(*index)
            }
            [] => Err(unknown_word(word, span)),
            _ => Err(Diagnostic::error(format!(
                "`{}` occurs {} times in the sentence",
                word.surface,
                found.len()
            ))
            .with_code(ErrorCode::E201)
            .with_label(span, ErrorCode::E201.description())
            .with_help(occurrence_help(word, found))),
        }
    }

    fn group(&mut self, group: &Group<'_>, span: Span) -> Result<ResolvedGroup> {
        let mut members: Vec<(TokenIndex, Span)> = Vec::with_capacity(group.members.len());
        for member in &group.members {
            let index = self.mention(member.inner(), member.span())?;
            if let Some((_, first)) = members.iter().find(|(seen, _)| *seen == index) {
                return Err(Diagnostic::error(format!(
                    "`{}` appears twice in the group",
                    member.inner()
                ))
                .with_code(ErrorCode::E206)
                .with_label(member.span(), ErrorCode::E206.description())
                .with_secondary_label(*first, "first listed here"));
            }
            members.push((index, member.span()));
        }

        let mut members: Vec<TokenIndex> = members.into_iter().map(|(index, _)| index).collect();
        members.sort_unstable();

        let head = match &group.head {
            Some(head) => Some(self.head(head, &members)?),
            None => None,
        };

        match self.groups.iter().find(|(declared, _)| {
            declared.iter().any(|index| members.binary_search(index).is_ok())
        }) {
            Some((declared, _)) if *declared == members => {}
            Some((_, first)) => {
                return Err(Diagnostic::error("group overlaps an earlier group")
                    .with_code(ErrorCode::E204)
                    .with_label(span, ErrorCode::E204.description())
                    .with_secondary_label(*first, "first declared here")
                    .with_help(
                        "a token can belong to only one group; repeat the same members to refer to it again",
                    ));
            }
            None => self.groups.push((members.clone(), span)),
        }

        Ok(ResolvedGroup { members, head })
    }

    /// Resolve a group head, preferring the member with that surface.
    fn head(&self, head: &Spanned<Word<'_>>, members: &[TokenIndex]) -> Result<TokenIndex> {
        let word = head.inner();
        if word.selector.is_none() {
            let mut candidates = members.iter().copied().filter(|index| {
                self.sentence
                    .get(*index)
                    .is_some_and(|token| token.surface() == word.surface)
            });
            if let (Some(only), None) = (candidates.next(), candidates.next()) {
                return Ok(only);
            }
        }

        let index = self.mention(word, head.span())?;
        if members.binary_search(&index).is_err() {
            return Err(Diagnostic::error(format!("head `{word}` is not a member of the group"))
                .with_code(ErrorCode::E205)
                .with_label(head.span(), ErrorCode::E205.description())
                .with_help("the word after `*` must be one of the words inside `[...]`"));
        }
        Ok(index)
    }

    fn declare_alias(&mut self, name: &Spanned<&str>) -> Result<AliasId> {
        let id = self.alias_id(name.inner());
        let declared = &mut self.aliases[id];
        if let Some(first) = *declared {
            return Err(
                Diagnostic::error(format!("alias `${}` is already declared", name.inner()))
                    .with_code(ErrorCode::E207)
                    .with_label(name.span(), ErrorCode::E207.description())
                    .with_secondary_label(first, "first declared here"),
            );
        }
        *declared = Some(name.span());
        Ok(AliasId(id))
    }

    fn reference_alias(&mut self, name: &str) -> AliasId {
        AliasId(self.alias_id(name))
    }

    /// Intern `name` without touching a recorded declaration.
    fn alias_id(&mut self, name: &str) -> usize {
        match self.aliases.get_index_of(name) {
            Some(id) => id,
            None => self.aliases.insert_full(name.to_string(), None).0,
        }
    }
}

fn unknown_word(word: &Word<'_>, span: Span) -> Diagnostic {
    Diagnostic::error(format!("`{}` does not occur in the sentence", word.surface))
        .with_code(ErrorCode::E200)
        .with_label(span, ErrorCode::E200.description())
        .with_help("words are matched exactly as they appear in the sentence, including case")
}

/// Suggest the selectors that pick out each occurrence.
fn occurrence_help(word: &Word<'_>, found: &[TokenIndex]) -> String {
    let with = |selector| {
        let mut word = word.clone();
        word.selector = Some(selector);
        format!("`{word}`")
    };
    match found {
        [] => "check the token positions of the sentence".to_string(),
        [index] => format!("use {}", with(Selector::Index(index.get()))),
        [first, ..] => format!(
            "pick one occurrence with {} .. {}, or by position as {}",
            with(Selector::Occurrence(1)),
            with(Selector::Occurrence(found.len())),
            with(Selector::Index(first.get())),
        ),
    }
}

/// Resolve every mention of `annotation` against `sentence`.
///
/// Statements are resolved in order and resolution stops at the first
/// failing mention.
pub fn resolve(annotation: &types::Annotation<'_>, sentence: &Sentence) -> Result<ResolvedAnnotation> {
    let mut resolver = Resolver::new(sentence);
    let statements = annotation
        .statements
        .iter()
        .map(|statement| {
            let resolved = resolver.statement(statement.inner())?;
            Ok(Spanned::new(resolved, statement.span()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolvedAnnotation {
        statements,
        aliases: resolver.aliases.into_keys().collect(),
    })
}
