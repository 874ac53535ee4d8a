//! Name-keyed adjacency view over a workflow snapshot.
//!
//! Nodes are addressed by display name; the petgraph structure plus the
//! name-to-index map acts as an arena, so traversals never follow object
//! pointers and always carry explicit visited state.

mod builder;
mod traversal;
mod types;

pub use builder::WorkflowGraph;
pub use traversal::{connects_back, find_cycles, reachable_from, reachable_within, upstream_of};
pub use types::{DanglingRef, GraphEdge, GraphNode, MissingEnd, NodeIndexMap};
