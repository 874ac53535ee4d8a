//! Workflow snapshot data model.
//!
//! Plain structured data exchanged with the surrounding service: a workflow
//! is a node list plus a connection map keyed by source node name, then
//! output category, then an array of branches each holding a list of
//! targets. The engine mutates in-memory copies of these shapes and never
//! owns a snapshot beyond a single call.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ================================
// Output categories
// ================================

/// Default output category carrying regular data flow.
pub const CATEGORY_MAIN: &str = "main";
/// Category carrying error output of a node.
pub const CATEGORY_ERROR: &str = "error";
/// Category wiring a node into an AI agent as an invocable tool.
pub const CATEGORY_AI_TOOL: &str = "ai_tool";

/// Branch index of the error output within the `main` category.
pub const ERROR_BRANCH: usize = 1;

// ================================
// Workflow
// ================================

/// Connection map: source node name -> category -> branches -> targets.
pub type ConnectionMap = HashMap<String, HashMap<String, Vec<Vec<ConnectionTarget>>>>;

/// A full workflow snapshot.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Workflow {
    /// Opaque external identity; never interpreted by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: ConnectionMap,
    #[serde(default)]
    pub settings: HashMap<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One pipeline step.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique display name within the workflow; connection endpoints refer
    /// to nodes by this name.
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default = "default_type_version", rename = "typeVersion")]
    pub type_version: f64,
    /// Opaque parameter blob; only `resource`/`operation` are interpreted,
    /// and only when the node type declares a vocabulary for them.
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, rename = "onError")]
    pub on_error: OnError,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
    /// Canvas position, carried through edits untouched except by MoveNode.
    #[serde(default)]
    pub position: [f64; 2],
}

fn default_type_version() -> f64 {
    1.0
}

/// Error-handling mode of a node.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum OnError {
    #[default]
    #[serde(rename = "stop")]
    Stop,
    ContinueRegularOutput,
    ContinueErrorOutput,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    #[serde(default = "default_max_tries")]
    pub max_tries: u32,
    #[serde(default = "default_wait_between_tries_ms")]
    pub wait_between_tries_ms: u64,
}

fn default_max_tries() -> u32 {
    3
}

fn default_wait_between_tries_ms() -> u64 {
    1000
}

/// One endpoint of a directed edge: the target side.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub node: String,
    /// Category echo, mirrors the map key it lives under.
    #[serde(rename = "type", default = "default_target_type")]
    pub connection_type: String,
    /// Input index on the target node.
    #[serde(default)]
    pub index: u32,
}

fn default_target_type() -> String {
    CATEGORY_MAIN.to_string()
}

// ================================
// Flattened connection view
// ================================

/// One connection flattened out of the nested map.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRef<'a> {
    pub source: &'a str,
    pub category: &'a str,
    /// Output branch index on the source node.
    pub branch: usize,
    pub target: &'a ConnectionTarget,
}

impl Workflow {
    pub fn get_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn get_node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    /// Total number of connections (individual targets) in the map.
    pub fn connection_count(&self) -> usize {
        self.connections
            .values()
            .flat_map(|by_category| by_category.values())
            .flat_map(|branches| branches.iter())
            .map(|targets| targets.len())
            .sum()
    }

    /// Flatten the connection map into a deterministic list.
    ///
    /// Sources are visited in node-list order (unknown sources afterwards,
    /// sorted by name) and categories in sorted order, so repeated calls on
    /// an unchanged workflow yield the same sequence.
    pub fn iter_connections(&self) -> Vec<ConnectionRef<'_>> {
        let mut out = Vec::new();

        let mut sources: Vec<&str> = self
            .nodes
            .iter()
            .map(|n| n.name.as_str())
            .filter(|name| self.connections.contains_key(*name))
            .collect();
        let mut unknown: Vec<&str> = self
            .connections
            .keys()
            .map(|s| s.as_str())
            .filter(|source| !self.has_node(source))
            .collect();
        unknown.sort_unstable();
        sources.extend(unknown);

        for source in sources {
            let Some(by_category) = self.connections.get(source) else {
                continue;
            };
            let mut categories: Vec<&str> = by_category.keys().map(|s| s.as_str()).collect();
            categories.sort_unstable();
            for category in categories {
                for (branch, targets) in by_category[category].iter().enumerate() {
                    for target in targets {
                        out.push(ConnectionRef {
                            source,
                            category,
                            branch,
                            target,
                        });
                    }
                }
            }
        }

        out
    }
}
