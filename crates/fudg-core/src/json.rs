//! JSON serialization of a [`Parse`].
//!
//! The document layout is fixed: `tokens`, `nodes`, `edges`, `roots`, in that
//! order, with `null` written for absent labels, roles and heads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    graph::{Edge, Node, NodeKind, Parse, Sentence},
    identifier::NodeId,
};

/// Errors raised when a JSON document does not describe a well-formed parse.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node at position {position} has id {found}")]
    NodeIdMismatch { position: usize, found: NodeId },

    #[error("edge {source_id} -> {target_id} references a node that does not exist")]
    DanglingEdge { source_id: NodeId, target_id: NodeId },

    #[error("root {0} does not exist")]
    DanglingRoot(NodeId),

    #[error("node {node} references token {token}, but the sentence has {len} tokens")]
    TokenOutOfRange { node: NodeId, token: usize, len: usize },

    #[error("head of node {0} is not one of its tokens")]
    HeadNotMember(NodeId),

    #[error("{kind} node {node} has an invalid shape: {reason}")]
    InvalidShape {
        node: NodeId,
        kind: NodeKind,
        reason: &'static str,
    },
}

/// Unwrap the result of serializing a [`DocumentRef`], which holds string
/// keys and string, integer or null values only.
fn infallible<T>(result: serde_json::Result<T>) -> T {
    match result {
        Ok(output) => output,
        Err(err) => unreachable!("parse document failed to serialize: {err}"),
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    tokens: Vec<&'a str>,
    nodes: &'a [Node],
    edges: &'a [Edge],
    roots: &'a [NodeId],
}

impl<'a> From<&'a Parse> for DocumentRef<'a> {
    fn from(parse: &'a Parse) -> Self {
        Self {
            tokens: parse.tokens().iter().map(|token| token.surface()).collect(),
            nodes: parse.nodes(),
            edges: parse.edges(),
            roots: parse.roots(),
        }
    }
}

#[derive(Deserialize)]
struct Document {
    tokens: Vec<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    roots: Vec<NodeId>,
}

impl Parse {
    /// Convert the parse into a JSON value.
    pub fn to_json(&self) -> Value {
        infallible(serde_json::to_value(DocumentRef::from(self)))
    }

    /// Serialize the parse as a single line of JSON.
    pub fn to_json_string(&self) -> String {
        infallible(serde_json::to_string(&DocumentRef::from(self)))
    }

    /// Serialize the parse as indented JSON.
    pub fn to_json_string_pretty(&self) -> String {
        infallible(serde_json::to_string_pretty(&DocumentRef::from(self)))
    }

    /// Read a parse back from its JSON form, checking structural integrity.
    pub fn from_json(text: &str) -> Result<Parse, SchemaError> {
        let document: Document = serde_json::from_str(text)?;
        let sentence = Sentence::new(document.tokens);

        for (position, node) in document.nodes.iter().enumerate() {
            if node.id().get() != position {
                return Err(SchemaError::NodeIdMismatch {
                    position,
                    found: node.id(),
                });
            }
            check_node(node, sentence.len())?;
        }

        let node_count = document.nodes.len();
        for edge in &document.edges {
            if edge.source().get() >= node_count || edge.target().get() >= node_count {
                return Err(SchemaError::DanglingEdge {
                    source_id: edge.source(),
                    target_id: edge.target(),
                });
            }
        }
        if let Some(root) = document.roots.iter().find(|root| root.get() >= node_count) {
            return Err(SchemaError::DanglingRoot(*root));
        }

        Ok(Parse::from_parts(
            sentence.tokens().to_vec(),
            document.nodes,
            document.edges,
            document.roots,
        ))
    }
}

fn check_node(node: &Node, sentence_len: usize) -> Result<(), SchemaError> {
    let shape = |reason| SchemaError::InvalidShape {
        node: node.id(),
        kind: node.kind(),
        reason,
    };

    if let Some(token) = node.tokens().iter().find(|token| token.get() >= sentence_len) {
        return Err(SchemaError::TokenOutOfRange {
            node: node.id(),
            token: token.get(),
            len: sentence_len,
        });
    }

    match node.kind() {
        NodeKind::Token => {
            if node.tokens().len() != 1 {
                return Err(shape("expected exactly one token"));
            }
            if node.head().is_some() {
                return Err(shape("token nodes have no head"));
            }
        }
        NodeKind::Group => {
            if node.tokens().is_empty() {
                return Err(shape("groups need at least one token"));
            }
            if !node.tokens().windows(2).all(|pair| pair[0] < pair[1]) {
                return Err(shape("group tokens must be distinct and in sentence order"));
            }
            if node.head().is_some_and(|head| !node.contains(head)) {
                return Err(SchemaError::HeadNotMember(node.id()));
            }
        }
        NodeKind::Implicit => {
            if !node.tokens().is_empty() || node.head().is_some() {
                return Err(shape("implicit nodes have no tokens"));
            }
        }
    }
    Ok(())
}
