//! Semantic validation of a built [`Parse`].
//!
//! A [`Validator`] runs a list of [`Rule`]s and collects every violation they
//! report. The default rule set checks token coverage, group overlap,
//! rootedness and duplicate edges; hosts add their own conventions with
//! [`Validator::with_rule`].

use std::{fmt, sync::Arc};

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::Dfs,
};

use crate::{
    graph::{Edge, NodeKind, Parse},
    identifier::{NodeId, TokenIndex},
};

/// A broken graph invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// No node contains this token.
    UncoveredToken { token: TokenIndex, surface: String },
    /// More than one node contains this token.
    MultiplyCoveredToken { token: TokenIndex, nodes: Vec<NodeId> },
    /// Two groups share member tokens.
    OverlappingGroups {
        first: NodeId,
        second: NodeId,
        shared: Vec<TokenIndex>,
    },
    /// The node is neither a root nor reachable from one.
    Unreachable { node: NodeId },
    /// The edge at `position` repeats the edge at `first`.
    DuplicateEdge {
        edge: Edge,
        first: usize,
        position: usize,
    },
    /// Reported by a host-supplied rule.
    Custom {
        rule: String,
        message: String,
        nodes: Vec<NodeId>,
    },
}

impl Violation {
    /// Nodes the violation is about, for pointing diagnostics at source.
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Violation::UncoveredToken { .. } => Vec::new(),
            Violation::MultiplyCoveredToken { nodes, .. } | Violation::Custom { nodes, .. } => {
                nodes.clone()
            }
            Violation::OverlappingGroups { first, second, .. } => vec![*first, *second],
            Violation::Unreachable { node } => vec![*node],
            Violation::DuplicateEdge { edge, .. } => vec![edge.source(), edge.target()],
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UncoveredToken { token, surface } => {
                write!(f, "token {token} `{surface}` is not covered by any node")
            }
            Violation::MultiplyCoveredToken { token, nodes } => {
                write!(f, "token {token} is covered by {} nodes:", nodes.len())?;
                for node in nodes {
                    write!(f, " {node}")?;
                }
                Ok(())
            }
            Violation::OverlappingGroups {
                first,
                second,
                shared,
            } => {
                write!(f, "groups {first} and {second} share tokens")?;
                for token in shared {
                    write!(f, " {token}")?;
                }
                Ok(())
            }
            Violation::Unreachable { node } => {
                write!(f, "node {node} is not reachable from any root")
            }
            Violation::DuplicateEdge { edge, .. } => write!(
                f,
                "edge {} -> {} is declared more than once",
                edge.source(),
                edge.target()
            ),
            Violation::Custom { rule, message, .. } => write!(f, "{rule}: {message}"),
        }
    }
}

/// A single semantic check.
pub trait Rule {
    /// Short name used in logs and custom violations.
    fn name(&self) -> &str;

    /// Append every violation found in `parse`.
    fn check(&self, parse: &Parse, violations: &mut Vec<Violation>);
}

/// Every token belongs to exactly one node.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coverage;

impl Rule for Coverage {
    fn name(&self) -> &str {
        "coverage"
    }

    fn check(&self, parse: &Parse, violations: &mut Vec<Violation>) {
        let mut owners: Vec<Vec<NodeId>> = vec![Vec::new(); parse.tokens().len()];
        for node in parse.nodes() {
            for token in node.tokens() {
                if let Some(slot) = owners.get_mut(token.get()) {
                    slot.push(node.id());
                }
            }
        }

        for (token, nodes) in parse.tokens().iter().zip(owners) {
            match nodes.len() {
                0 => violations.push(Violation::UncoveredToken {
                    token: token.index(),
                    surface: token.surface().to_string(),
                }),
                1 => {}
                _ => violations.push(Violation::MultiplyCoveredToken {
                    token: token.index(),
                    nodes,
                }),
            }
        }
    }
}

/// Group member sets are pairwise disjoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlappingGroups;

impl Rule for NoOverlappingGroups {
    fn name(&self) -> &str {
        "no-overlapping-groups"
    }

    fn check(&self, parse: &Parse, violations: &mut Vec<Violation>) {
        let mut groups_of_token: IndexMap<TokenIndex, Vec<NodeId>> = IndexMap::new();
        for node in parse.nodes().iter().filter(|n| n.kind() == NodeKind::Group) {
            for token in node.tokens() {
                groups_of_token.entry(*token).or_default().push(node.id());
            }
        }

        let mut shared: IndexMap<(NodeId, NodeId), Vec<TokenIndex>> = IndexMap::new();
        for (token, groups) in &groups_of_token {
            for (i, first) in groups.iter().enumerate() {
                for second in &groups[i + 1..] {
                    shared.entry((*first, *second)).or_default().push(*token);
                }
            }
        }

        violations.extend(shared.into_iter().map(|((first, second), mut shared)| {
            shared.sort_unstable();
            Violation::OverlappingGroups {
                first,
                second,
                shared,
            }
        }));
    }
}

/// Every node is a root or reachable from one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rootedness;

impl Rule for Rootedness {
    fn name(&self) -> &str {
        "rootedness"
    }

    fn check(&self, parse: &Parse, violations: &mut Vec<Violation>) {
        let count = parse.nodes().len();
        let mut graph = DiGraph::<(), ()>::with_capacity(count, parse.edges().len());
        for _ in 0..count {
            graph.add_node(());
        }
        for edge in parse.edges() {
            let (source, target) = (edge.source().get(), edge.target().get());
            if source < count && target < count {
                graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
            }
        }

        let mut reached = vec![false; count];
        let mut dfs = Dfs::empty(&graph);
        for root in parse.roots().iter().filter(|root| root.get() < count) {
            dfs.move_to(NodeIndex::new(root.get()));
            while let Some(index) = dfs.next(&graph) {
                reached[index.index()] = true;
            }
        }

        violations.extend(
            reached
                .into_iter()
                .enumerate()
                .filter(|(_, reached)| !reached)
                .map(|(index, _)| Violation::Unreachable {
                    node: NodeId::new(index),
                }),
        );
    }
}

/// No edge appears twice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDuplicateEdges;

impl Rule for NoDuplicateEdges {
    fn name(&self) -> &str {
        "no-duplicate-edges"
    }

    fn check(&self, parse: &Parse, violations: &mut Vec<Violation>) {
        let mut seen: IndexSet<&Edge> = IndexSet::new();
        for (position, edge) in parse.edges().iter().enumerate() {
            let (first, inserted) = seen.insert_full(edge);
            if !inserted {
                violations.push(Violation::DuplicateEdge {
                    edge: edge.clone(),
                    first,
                    position,
                });
            }
        }
    }
}

/// Runs a set of rules against a parse.
#[derive(Clone)]
pub struct Validator {
    rules: Vec<Arc<dyn Rule + Send + Sync>>,
}

impl Validator {
    /// A validator with no rules at all.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule; it runs after the ones already present.
    pub fn with_rule(mut self, rule: impl Rule + Send + Sync + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Names of the configured rules, in run order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name())
    }

    /// Run every rule and return all violations found.
    pub fn validate(&self, parse: &Parse) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        for rule in &self.rules {
            let before = violations.len();
            rule.check(parse, &mut violations);
            trace!(rule = rule.name(), found = violations.len() - before; "Rule checked");
        }

        if violations.is_empty() {
            Ok(())
        } else {
            debug!(violations = violations.len(); "Semantic validation failed");
            Err(violations)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::empty()
            .with_rule(Coverage)
            .with_rule(NoOverlappingGroups)
            .with_rule(Rootedness)
            .with_rule(NoDuplicateEdges)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Validate with the default rule set.
pub fn validate(parse: &Parse) -> Result<(), Vec<Violation>> {
    Validator::default().validate(parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, Sentence};

    fn id(index: usize) -> NodeId {
        NodeId::new(index)
    }

    fn tok(index: usize) -> TokenIndex {
        TokenIndex::new(index)
    }

    #[test]
    fn test_valid_parse_passes() {
        let sentence = Sentence::new(["dogs", "bark"]);
        let nodes = vec![Node::token(id(0), tok(1)), Node::token(id(1), tok(0))];
        let edges = vec![Edge::new(id(0), id(1))];
        let parse = Parse::assemble(sentence, nodes, edges, []);

        assert_eq!(validate(&parse), Ok(()));
    }

    #[test]
    fn test_uncovered_token() {
        let sentence = Sentence::new(["dogs", "bark", "loudly"]);
        let nodes = vec![Node::token(id(0), tok(1)), Node::token(id(1), tok(0))];
        let edges = vec![Edge::new(id(0), id(1))];
        let parse = Parse::assemble(sentence, nodes, edges, []);

        let violations = validate(&parse).unwrap_err();
        assert_eq!(
            violations,
            vec![Violation::UncoveredToken {
                token: tok(2),
                surface: "loudly".to_string(),
            }]
        );
    }

    #[test]
    fn test_cycle_without_root_is_unreachable() {
        let sentence = Sentence::new(["a", "b", "c"]);
        let nodes = (0..3).map(|i| Node::token(id(i), tok(i))).collect();
        let edges = vec![
            Edge::new(id(1), id(2)),
            Edge::new(id(2), id(1)),
        ];
        let parse = Parse::assemble(sentence, nodes, edges, []);

        let violations = validate(&parse).unwrap_err();
        assert_eq!(
            violations,
            vec![
                Violation::Unreachable { node: id(1) },
                Violation::Unreachable { node: id(2) },
            ]
        );
    }

    #[test]
    fn test_explicit_root_makes_cycle_reachable() {
        let sentence = Sentence::new(["a", "b"]);
        let nodes = (0..2).map(|i| Node::token(id(i), tok(i))).collect();
        let edges = vec![Edge::new(id(0), id(1)), Edge::new(id(1), id(0))];
        let parse = Parse::assemble(sentence, nodes, edges, [id(0)]);

        assert_eq!(validate(&parse), Ok(()));
    }

    #[test]
    fn test_all_violations_are_collected() {
        let sentence = Sentence::new(["a", "b", "c"]);
        let nodes = vec![
            Node::group(id(0), vec![tok(0), tok(1)], None),
            Node::group(id(1), vec![tok(1), tok(2)], None),
        ];
        let edges = vec![Edge::new(id(0), id(1)), Edge::new(id(0), id(1))];
        let parse = Parse::assemble(sentence, nodes, edges, []);

        let violations = validate(&parse).unwrap_err();
        assert_eq!(
            violations,
            vec![
                Violation::MultiplyCoveredToken {
                    token: tok(1),
                    nodes: vec![id(0), id(1)],
                },
                Violation::OverlappingGroups {
                    first: id(0),
                    second: id(1),
                    shared: vec![tok(1)],
                },
                Violation::DuplicateEdge {
                    edge: Edge::new(id(0), id(1)),
                    first: 0,
                    position: 1,
                },
            ]
        );
    }

    struct NoSelfLoops;

    impl Rule for NoSelfLoops {
        fn name(&self) -> &str {
            "no-self-loops"
        }

        fn check(&self, parse: &Parse, violations: &mut Vec<Violation>) {
            for edge in parse.edges() {
                if edge.source() == edge.target() {
                    violations.push(Violation::Custom {
                        rule: self.name().to_string(),
                        message: format!("node {} governs itself", edge.source()),
                        nodes: vec![edge.source()],
                    });
                }
            }
        }
    }

    #[test]
    fn test_custom_rule() {
        let sentence = Sentence::new(["a"]);
        let nodes = vec![Node::token(id(0), tok(0))];
        let edges = vec![Edge::new(id(0), id(0))];
        let parse = Parse::assemble(sentence, nodes, edges, [id(0)]);

        assert_eq!(validate(&parse), Ok(()));

        let validator = Validator::default().with_rule(NoSelfLoops);
        let violations = validator.validate(&parse).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "no-self-loops: node 0 governs itself");
    }

    #[test]
    fn test_validator_debug_lists_rules() {
        let debug = format!("{:?}", Validator::default());
        assert!(debug.contains("coverage"));
        assert!(debug.contains("no-duplicate-edges"));
    }
}
