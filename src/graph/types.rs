use petgraph::stable_graph::NodeIndex;

/// Graph node payload: the slice of a workflow node the traversals need.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub name: String,
    pub node_type: String,
    pub disabled: bool,
}

/// Graph edge payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    /// Output category on the source node (`main`, `error`, `ai_tool`, ...).
    pub category: String,
    /// Output branch index within the category.
    pub branch: usize,
    /// Input index on the target node.
    pub input_index: u32,
}

/// Which end of a connection referenced a missing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEnd {
    Source,
    Target,
}

/// A connection that could not be added to the graph because one endpoint
/// does not exist in the workflow. Collected at build time and reported by
/// the validator; never a build failure.
#[derive(Debug, Clone)]
pub struct DanglingRef {
    pub source: String,
    pub category: String,
    pub branch: usize,
    pub target: String,
    pub end: MissingEnd,
}

/// Node name to petgraph NodeIndex mapping.
pub type NodeIndexMap = std::collections::HashMap<String, NodeIndex>;
