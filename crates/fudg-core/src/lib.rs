//! FUDG Core Types and Definitions
//!
//! This crate provides the graph model produced by the GFL compiler. It
//! includes:
//!
//! - **Identifiers**: Typed token positions and node ids ([`identifier`] module)
//! - **Graph**: Sentences, nodes, edges and the [`graph::Parse`] they form
//! - **JSON**: The fixed FUDG document layout and schema checks ([`json`] module)
//! - **Validation**: Semantic rules over a finished parse ([`validate`] module)

pub mod graph;
pub mod identifier;
pub mod json;
pub mod validate;
