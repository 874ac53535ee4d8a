use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::schema::Workflow;

use super::types::*;

/// Adjacency view built from a workflow snapshot.
///
/// Building never fails: connections whose endpoints do not exist are kept
/// aside as [`DanglingRef`]s instead of edges. Duplicate node names map to
/// the first occurrence; the validator reports the duplication itself.
#[derive(Debug)]
pub struct WorkflowGraph {
    pub graph: StableDiGraph<GraphNode, GraphEdge>,
    pub node_index_map: NodeIndexMap,
    pub dangling: Vec<DanglingRef>,
}

impl WorkflowGraph {
    pub fn build(workflow: &Workflow) -> Self {
        let mut graph = StableDiGraph::new();
        let mut node_index_map = NodeIndexMap::new();

        for node in &workflow.nodes {
            if node_index_map.contains_key(&node.name) {
                continue;
            }
            let idx = graph.add_node(GraphNode {
                name: node.name.clone(),
                node_type: node.node_type.clone(),
                disabled: node.disabled,
            });
            node_index_map.insert(node.name.clone(), idx);
        }

        let mut dangling = Vec::new();
        for conn in workflow.iter_connections() {
            let source_idx = node_index_map.get(conn.source).copied();
            let target_idx = node_index_map.get(conn.target.node.as_str()).copied();

            if let (Some(source), Some(target)) = (source_idx, target_idx) {
                graph.add_edge(
                    source,
                    target,
                    GraphEdge {
                        category: conn.category.to_string(),
                        branch: conn.branch,
                        input_index: conn.target.index,
                    },
                );
                continue;
            }

            if source_idx.is_none() {
                dangling.push(DanglingRef {
                    source: conn.source.to_string(),
                    category: conn.category.to_string(),
                    branch: conn.branch,
                    target: conn.target.node.clone(),
                    end: MissingEnd::Source,
                });
            }
            if target_idx.is_none() {
                dangling.push(DanglingRef {
                    source: conn.source.to_string(),
                    category: conn.category.to_string(),
                    branch: conn.branch,
                    target: conn.target.node.clone(),
                    end: MissingEnd::Target,
                });
            }
        }

        Self {
            graph,
            node_index_map,
            dangling,
        }
    }

    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.node_index_map.get(name).copied()
    }

    pub fn get_node(&self, name: &str) -> Option<&GraphNode> {
        self.index_of(name).and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_index_map.contains_key(name)
    }

    /// Node names in workflow order.
    pub fn node_names(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx).map(|n| n.name.as_str()))
            .collect()
    }

    pub fn successors(&self, name: &str) -> Vec<&str> {
        let Some(idx) = self.index_of(name) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .filter_map(|n| self.graph.node_weight(n).map(|node| node.name.as_str()))
            .collect()
    }

    pub fn predecessors(&self, name: &str) -> Vec<&str> {
        let Some(idx) = self.index_of(name) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n).map(|node| node.name.as_str()))
            .collect()
    }

    /// Outgoing edges of a node with their target names.
    pub fn edges_from(&self, name: &str) -> Vec<(&GraphEdge, &str)> {
        let Some(idx) = self.index_of(name) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .filter_map(|edge| {
                self.graph
                    .node_weight(edge.target())
                    .map(|target| (edge.weight(), target.name.as_str()))
            })
            .collect()
    }

    /// Target names of one specific output branch.
    pub fn targets_of_branch(&self, name: &str, category: &str, branch: usize) -> Vec<&str> {
        self.edges_from(name)
            .into_iter()
            .filter(|(edge, _)| edge.category == category && edge.branch == branch)
            .map(|(_, target)| target)
            .collect()
    }

    pub fn has_incoming(&self, name: &str) -> bool {
        self.index_of(name)
            .map(|idx| {
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .next()
                    .is_some()
            })
            .unwrap_or(false)
    }

    pub fn has_outgoing(&self, name: &str) -> bool {
        self.index_of(name)
            .map(|idx| {
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Outgoing)
                    .next()
                    .is_some()
            })
            .unwrap_or(false)
    }
}
