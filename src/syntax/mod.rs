//! Syntax: the fully materialized, mutable node graph.
//!
//! ```text
//! TreeBuilder (events from the parser)
//!     ↓
//! Tree (arena of NodeId-addressed nodes, lossless text)
//!     ↓
//! roles / modifiers (typed lookups used by the façade layer)
//! ```

mod builder;
mod modifiers;
mod role;
mod tree;

pub use builder::{Checkpoint, TreeBuilder};
pub use modifiers::{ModifierSet, Modifiers};
pub use role::ChildRole;
pub use tree::{Children, Descendants, NodeId, Tree, TreeError};

// Re-export Position and Span from base for convenience
pub use crate::base::{Position, Span};
