//! Graph construction from a resolved annotation.
//!
//! Statements are applied in source order. Nodes are created on first
//! mention and every token remembers the node that owns it, so a token
//! declared in a group is represented by that group from then on.

use indexmap::IndexSet;
use log::{debug, trace};

use fudg_core::{
    graph::{Edge, Node, NodeKind, Parse, Sentence},
    identifier::{NodeId, TokenIndex},
};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    parser_types::Direction,
    resolve::{ROperand, RPrimary, ResolvedAnnotation, ResolvedGroup, ResolvedStatement, Target},
    span::Span,
};

/// Role given to edges that involve a coordination.
pub const COORDINATION_ROLE: &str = "coord";

/// The built graph together with the source span that introduced each node.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub parse: Parse,
    /// Indexed by node id.
    pub node_spans: Vec<Span>,
}

struct Builder<'a> {
    sentence: &'a Sentence,
    nodes: Vec<Node>,
    node_spans: Vec<Span>,
    edges: IndexSet<Edge>,
    edge_spans: Vec<Span>,
    /// Owning node of each token, indexed by token index.
    owners: Vec<Option<NodeId>>,
    /// Bound node of each alias, indexed by alias id.
    aliases: Vec<Option<NodeId>>,
    explicit_roots: Vec<NodeId>,
}

impl<'a> Builder<'a> {
    fn new(sentence: &'a Sentence, alias_count: usize) -> Self {
        Self {
            sentence,
            nodes: Vec::new(),
            node_spans: Vec::new(),
            edges: IndexSet::new(),
            edge_spans: Vec::new(),
            owners: vec![None; sentence.len()],
            aliases: vec![None; alias_count],
            explicit_roots: Vec::new(),
        }
    }

    fn add_node(&mut self, make: impl FnOnce(NodeId) -> Node, span: Span) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let node = make(id);
        trace!(id = id.get(), kind:% = node.kind(); "Created node");
        self.nodes.push(node);
        self.node_spans.push(span);
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.get()]
    }

    fn statement(&mut self, statement: &ResolvedStatement, names: &[String]) -> Result<()> {
        match statement {
            ResolvedStatement::Chain { first, links } => {
                let mut left = self.operand(first, names)?;
                let mut left_is_coordination = first.is_coordination();
                if links.is_empty() && left_is_coordination {
                    self.coordination_head(&left, first.span)?;
                }

                for link in links {
                    let right = self.operand(&link.operand, names)?;
                    // The parser only lets `coord` through on coordinated links.
                    let role = if left_is_coordination || link.operand.is_coordination() {
                        Some(COORDINATION_ROLE)
                    } else {
                        link.role.as_deref()
                    };

                    for &l in &left {
                        for &r in &right {
                            let (source, target) = match link.direction {
                                Direction::Governs => (l, r),
                                Direction::GovernedBy => (r, l),
                            };
                            let edge = edge(source, target, link.label.as_deref(), role);
                            self.add_edge(edge, link.span)?;
                        }
                    }

                    left = right;
                    left_is_coordination = link.operand.is_coordination();
                }
                Ok(())
            }
            ResolvedStatement::Alias { alias, value } => {
                let nodes = self.operand(value, names)?;
                let bound = if value.is_coordination() {
                    self.coordination_head(&nodes, value.span)?
                } else {
                    nodes[0]
                };
                trace!(alias = names[alias.get()].as_str(), node = bound.get(); "Bound alias");
                self.aliases[alias.get()] = Some(bound);
                Ok(())
            }
        }
    }

    fn operand(&mut self, operand: &ROperand, names: &[String]) -> Result<Vec<NodeId>> {
        operand
            .primaries
            .iter()
            .map(|primary| self.primary(primary, names))
            .collect()
    }

    fn primary(&mut self, primary: &RPrimary, names: &[String]) -> Result<NodeId> {
        let id = match &primary.target {
            Target::Token(index) => self.token(*index, primary.span),
            Target::Group(group) => self.group(group, primary.span)?,
            Target::Alias(alias) => self.aliases[alias.get()].ok_or_else(|| {
                let name = &names[alias.get()];
                Diagnostic::error(format!("alias `${name}` is used before it is declared"))
                    .with_code(ErrorCode::E302)
                    .with_label(primary.span, ErrorCode::E302.description())
                    .with_help(format!("declare it first with `${name} = ...`"))
            })?,
        };
        if primary.root {
            self.explicit_roots.push(id);
        }
        Ok(id)
    }

    /// The node owning `index`, created as a token node on first mention.
    fn token(&mut self, index: TokenIndex, span: Span) -> NodeId {
        if let Some(owner) = self.owners[index.get()] {
            return owner;
        }
        let id = self.add_node(|id| Node::token(id, index), span);
        self.owners[index.get()] = Some(id);
        id
    }

    fn group(&mut self, group: &ResolvedGroup, span: Span) -> Result<NodeId> {
        if let Some(existing) = group.members.first().and_then(|m| self.owners[m.get()]) {
            let node = self.node(existing);
            if node.kind() == NodeKind::Group && node.tokens() == group.members.as_slice() {
                if group.head.is_some() && group.head != node.head() {
                    return Err(Diagnostic::error("group is redeclared with a different head")
                        .with_code(ErrorCode::E301)
                        .with_label(span, ErrorCode::E301.description())
                        .with_secondary_label(self.node_spans[existing.get()], "first declared here")
                        .with_help(head_help(node.head().map(|head| self.surface(head)))));
                }
                return Ok(existing);
            }
        }

        for member in &group.members {
            if let Some(owner) = self.owners[member.get()] {
                let surface = self.surface(*member);
                let message = match self.node(owner).kind() {
                    NodeKind::Token => format!("`{surface}` is already used on its own"),
                    _ => format!("`{surface}` already belongs to another group"),
                };
                return Err(Diagnostic::error(message)
                    .with_code(ErrorCode::E301)
                    .with_label(span, ErrorCode::E301.description())
                    .with_secondary_label(self.node_spans[owner.get()], "first used here")
                    .with_help("declare the group before mentioning its members"));
            }
        }

        let members = group.members.clone();
        let id = self.add_node(|id| Node::group(id, members, group.head), span);
        for member in &group.members {
            self.owners[member.get()] = Some(id);
        }
        Ok(id)
    }

    /// Create an implicit node governing every conjunct.
    fn coordination_head(&mut self, conjuncts: &[NodeId], span: Span) -> Result<NodeId> {
        let head = self.add_node(Node::implicit, span);
        for &conjunct in conjuncts {
            self.add_edge(Edge::new(head, conjunct).with_role(COORDINATION_ROLE), span)?;
        }
        Ok(head)
    }

    fn add_edge(&mut self, edge: Edge, span: Span) -> Result<()> {
        let description = format!(
            "`{}` -> `{}`",
            self.describe(edge.source()),
            self.describe(edge.target())
        );
        let (index, inserted) = self.edges.insert_full(edge);
        if !inserted {
            return Err(Diagnostic::error(format!("duplicate edge {description}"))
                .with_code(ErrorCode::E300)
                .with_label(span, ErrorCode::E300.description())
                .with_secondary_label(self.edge_spans[index], "first added here"));
        }
        self.edge_spans.push(span);
        Ok(())
    }

    fn surface(&self, index: TokenIndex) -> &str {
        self.sentence.get(index).map_or("", |token| token.surface())
    }

    fn describe(&self, id: NodeId) -> String {
        let node = self.node(id);
        match node.kind() {
            NodeKind::Token => node
                .tokens()
                .first()
                .map_or_else(String::new, |index| self.surface(*index).to_string()),
            NodeKind::Group => {
                let surfaces: Vec<&str> = node.tokens().iter().map(|i| self.surface(*i)).collect();
                format!("[{}]", surfaces.join(" "))
            }
            NodeKind::Implicit => format!("coordination {id}"),
        }
    }
}

impl Builder<'_> {
    fn finish(self) -> (Vec<Node>, Vec<Span>, Vec<Edge>, Vec<NodeId>) {
        (
            self.nodes,
            self.node_spans,
            self.edges.into_iter().collect(),
            self.explicit_roots,
        )
    }
}

/// The first declaration of a group fixes its head. A later mention may
/// repeat that head or omit it.
fn head_help(first: Option<&str>) -> String {
    match first {
        Some(head) => {
            format!("the first declaration set the head to `{head}`; repeat it or leave it out")
        }
        None => "the first declaration gave no head, so later mentions cannot add one; \
                 put the head on the first declaration"
            .to_string(),
    }
}

fn edge(source: NodeId, target: NodeId, label: Option<&str>, role: Option<&str>) -> Edge {
    let mut edge = Edge::new(source, target);
    if let Some(label) = label {
        edge = edge.with_label(label);
    }
    if let Some(role) = role {
        edge = edge.with_role(role);
    }
    edge
}

/// Build the graph for `resolved` over `sentence`.
pub fn build(resolved: &ResolvedAnnotation, sentence: Sentence) -> Result<BuildOutput> {
    let mut builder = Builder::new(&sentence, resolved.aliases.len());
    for statement in &resolved.statements {
        builder.statement(statement.inner(), &resolved.aliases)?;
    }

    let (nodes, node_spans, edges, explicit_roots) = builder.finish();
    debug!(nodes = nodes.len(), edges = edges.len(); "Graph built");

    Ok(BuildOutput {
        parse: Parse::assemble(sentence, nodes, edges, explicit_roots),
        node_spans,
    })
}
