//! The FUDG graph model.
//!
//! A [`Parse`] owns the sentence it was built for together with the nodes
//! and edges the annotation introduced. Fragmentation is allowed: a parse
//! may consist of several disconnected fragments, each with its own root.
//!
//! # Example
//!
//! ```
//! use fudg_core::{
//!     graph::{Edge, Node, Parse, Sentence},
//!     identifier::{NodeId, TokenIndex},
//! };
//!
//! let sentence = Sentence::new(["dogs", "bark"]);
//! let nodes = vec![
//!     Node::token(NodeId::new(0), TokenIndex::new(1)),
//!     Node::token(NodeId::new(1), TokenIndex::new(0)),
//! ];
//! let edges = vec![Edge::new(NodeId::new(0), NodeId::new(1))];
//!
//! let parse = Parse::assemble(sentence, nodes, edges, []);
//! assert_eq!(parse.roots(), &[NodeId::new(0)]);
//! ```

use std::{collections::HashSet, fmt};

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::identifier::{NodeId, TokenIndex};

/// A word of the input sentence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    index: TokenIndex,
    surface: String,
}

impl Token {
    /// Create a token at the given sentence position.
    pub fn new(index: TokenIndex, surface: impl Into<String>) -> Self {
        Self {
            index,
            surface: surface.into(),
        }
    }

    /// Position of the token in the sentence.
    pub fn index(&self) -> TokenIndex {
        self.index
    }

    /// The word as it appears in the sentence.
    pub fn surface(&self) -> &str {
        &self.surface
    }
}

/// The pre-tokenized sentence an annotation is written against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    /// Build a sentence from its words, numbering them from zero.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = words
            .into_iter()
            .enumerate()
            .map(|(index, word)| Token::new(TokenIndex::new(index), word))
            .collect();
        Self { tokens }
    }

    /// All tokens, in sentence order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The token at `index`, if the sentence is long enough.
    pub fn get(&self, index: TokenIndex) -> Option<&Token> {
        self.tokens.get(index.get())
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the sentence has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Positions of every token whose surface equals `surface`, in order.
    pub fn occurrences<'a>(&'a self, surface: &'a str) -> impl Iterator<Item = TokenIndex> + 'a {
        self.tokens
            .iter()
            .filter(move |token| token.surface == surface)
            .map(Token::index)
    }

    fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

/// What a [`Node`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A single sentence token.
    Token,
    /// A multiword unit declared with `[...]`.
    Group,
    /// A node with no tokens of its own, such as an elided coordination head.
    Implicit,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Token => write!(f, "token"),
            NodeKind::Group => write!(f, "group"),
            NodeKind::Implicit => write!(f, "implicit"),
        }
    }
}

/// A vertex of the graph.
///
/// Field names double as the JSON schema keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    tokens: Vec<TokenIndex>,
    head: Option<TokenIndex>,
}

impl Node {
    /// A node for one sentence token.
    pub fn token(id: NodeId, index: TokenIndex) -> Self {
        Self {
            id,
            kind: NodeKind::Token,
            tokens: vec![index],
            head: None,
        }
    }

    /// A multiword group. Members are kept in sentence order.
    pub fn group(id: NodeId, mut members: Vec<TokenIndex>, head: Option<TokenIndex>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self {
            id,
            kind: NodeKind::Group,
            tokens: members,
            head,
        }
    }

    /// A node introduced by the annotation itself.
    pub fn implicit(id: NodeId) -> Self {
        Self {
            id,
            kind: NodeKind::Implicit,
            tokens: Vec::new(),
            head: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Member tokens in sentence order; empty for implicit nodes.
    pub fn tokens(&self) -> &[TokenIndex] {
        &self.tokens
    }

    /// Syntactic head of a group, if one was marked.
    pub fn head(&self) -> Option<TokenIndex> {
        self.head
    }

    pub fn contains(&self, index: TokenIndex) -> bool {
        self.tokens.binary_search(&index).is_ok()
    }
}

/// A directed relation from a governor (`source`) to a dependent (`target`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
    label: Option<String>,
    role: Option<String>,
}

impl Edge {
    /// An unlabeled edge.
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            label: None,
            role: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

/// The result of compiling one annotation: a possibly fragmented graph over
/// a sentence.
///
/// Nodes and edges enumerate in the order they were declared, which keeps
/// serialized output stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    tokens: Vec<Token>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    roots: Vec<NodeId>,
}

impl Parse {
    /// Assemble a parse and compute its root set.
    ///
    /// Roots are the nodes without incoming edges plus every node listed in
    /// `explicit_roots`, sorted by id.
    pub fn assemble(
        sentence: Sentence,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        explicit_roots: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        let targets: HashSet<NodeId> = edges.iter().map(|edge| edge.target).collect();

        let mut roots: Vec<NodeId> = nodes
            .iter()
            .filter(|node| !targets.contains(&node.id))
            .map(Node::id)
            .chain(explicit_roots)
            .collect();
        roots.sort_unstable();
        roots.dedup();

        Self::from_parts(sentence.into_tokens(), nodes, edges, roots)
    }

    /// Build a parse from already computed parts, without deriving roots.
    pub(crate) fn from_parts(
        tokens: Vec<Token>,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        roots: Vec<NodeId>,
    ) -> Self {
        Self {
            tokens,
            nodes,
            edges,
            roots,
        }
    }

    /// The sentence tokens, in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// All nodes, in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The root set, sorted by id.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.get())
    }

    /// The first node whose member tokens include `index`.
    pub fn node_for_token(&self, index: TokenIndex) -> Option<&Node> {
        self.nodes.iter().find(|node| node.contains(index))
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.roots.binary_search(&id).is_ok()
    }

    /// Edges whose target is `id`.
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.target == id)
    }

    /// Edges whose source is `id`.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.source == id)
    }

    /// Connected components of the graph, ignoring edge direction.
    ///
    /// Each fragment lists its node ids in ascending order; fragments are
    /// ordered by their smallest id.
    pub fn fragments(&self) -> Vec<Vec<NodeId>> {
        let mut components = UnionFind::<usize>::new(self.nodes.len());
        for edge in &self.edges {
            let (source, target) = (edge.source.get(), edge.target.get());
            if source < self.nodes.len() && target < self.nodes.len() {
                components.union(source, target);
            }
        }

        let labels = components.into_labeling();
        let mut fragments: Vec<Vec<NodeId>> = Vec::new();
        let mut fragment_of_label: Vec<Option<usize>> = vec![None; labels.len()];
        for (index, label) in labels.into_iter().enumerate() {
            let slot = match fragment_of_label[label] {
                Some(slot) => slot,
                None => {
                    fragments.push(Vec::new());
                    fragment_of_label[label] = Some(fragments.len() - 1);
                    fragments.len() - 1
                }
            };
            fragments[slot].push(NodeId::new(index));
        }
        fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: usize) -> NodeId {
        NodeId::new(index)
    }

    fn tok(index: usize) -> TokenIndex {
        TokenIndex::new(index)
    }

    #[test]
    fn test_sentence_occurrences() {
        let sentence = Sentence::new(["the", "cat", "chased", "the", "mouse"]);

        let found: Vec<_> = sentence.occurrences("the").collect();
        assert_eq!(found, vec![tok(0), tok(3)]);
        assert_eq!(sentence.occurrences("dog").count(), 0);
        assert_eq!(sentence.get(tok(4)).map(Token::surface), Some("mouse"));
        assert!(sentence.get(tok(5)).is_none());
    }

    #[test]
    fn test_group_members_are_sorted() {
        let node = Node::group(id(0), vec![tok(3), tok(1), tok(2)], Some(tok(2)));

        assert_eq!(node.kind(), NodeKind::Group);
        assert_eq!(node.tokens(), &[tok(1), tok(2), tok(3)]);
        assert!(node.contains(tok(3)));
        assert!(!node.contains(tok(0)));
    }

    #[test]
    fn test_roots_with_sparse_node_ids() {
        let sentence = Sentence::new(["a", "b"]);
        let nodes = vec![Node::token(id(7), tok(0)), Node::token(id(3), tok(1))];
        let edges = vec![Edge::new(id(7), id(3))];

        let parse = Parse::assemble(sentence, nodes, edges, []);

        assert_eq!(parse.roots(), &[id(7)]);
    }

    #[test]
    fn test_roots_are_nodes_without_incoming_edges() {
        let sentence = Sentence::new(["a", "b", "c", "d"]);
        let nodes = (0..4).map(|i| Node::token(id(i), tok(i))).collect();
        let edges = vec![Edge::new(id(0), id(1)), Edge::new(id(2), id(3))];

        let parse = Parse::assemble(sentence, nodes, edges, []);

        assert_eq!(parse.roots(), &[id(0), id(2)]);
        assert!(parse.is_root(id(2)));
        assert!(!parse.is_root(id(3)));
    }

    #[test]
    fn test_explicit_roots_join_the_root_set() {
        let sentence = Sentence::new(["a", "b"]);
        let nodes = vec![Node::token(id(0), tok(0)), Node::token(id(1), tok(1))];
        let edges = vec![Edge::new(id(0), id(1)), Edge::new(id(1), id(0))];

        let parse = Parse::assemble(sentence, nodes, edges, [id(1), id(1)]);

        assert_eq!(parse.roots(), &[id(1)]);
    }

    #[test]
    fn test_fragments_ignore_direction() {
        let sentence = Sentence::new(["a", "b", "c", "d", "e"]);
        let nodes = (0..5).map(|i| Node::token(id(i), tok(i))).collect();
        let edges = vec![
            Edge::new(id(1), id(0)),
            Edge::new(id(3), id(4)),
            Edge::new(id(1), id(4)),
        ];

        let parse = Parse::assemble(sentence, nodes, edges, []);

        assert_eq!(
            parse.fragments(),
            vec![vec![id(0), id(1), id(3), id(4)], vec![id(2)]]
        );
    }

    #[test]
    fn test_incoming_and_outgoing() {
        let sentence = Sentence::new(["a", "b", "c"]);
        let nodes = (0..3).map(|i| Node::token(id(i), tok(i))).collect();
        let edges = vec![
            Edge::new(id(0), id(1)).with_label("x"),
            Edge::new(id(0), id(2)),
        ];

        let parse = Parse::assemble(sentence, nodes, edges, []);

        assert_eq!(parse.outgoing(id(0)).count(), 2);
        assert_eq!(parse.incoming(id(1)).next().and_then(Edge::label), Some("x"));
        assert_eq!(parse.incoming(id(0)).count(), 0);
    }
}
