//! Strongly typed identifiers for sentence tokens and graph nodes.
//!
//! Annotation text refers to words by surface form; everything past the
//! resolver works with these identifiers instead, so a token position can
//! never be confused with a node id.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw index.
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Return the raw index.
            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// 0-based position of a word in the sentence.
    ///
    /// # Examples
    ///
    /// ```
    /// use fudg_core::identifier::TokenIndex;
    ///
    /// let index = TokenIndex::new(3);
    /// assert_eq!(index.get(), 3);
    /// assert_eq!(index.to_string(), "3");
    /// ```
    TokenIndex
}

define_id! {
    /// Identifier of a node in a [`Parse`](crate::graph::Parse).
    ///
    /// Ids are handed out in creation order starting at zero, so the id of a
    /// node is also its position in [`Parse::nodes`](crate::graph::Parse::nodes).
    NodeId
}
