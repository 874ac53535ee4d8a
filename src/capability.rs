//! Capability descriptors for node types.
//!
//! The engine never inspects node implementations; everything it knows about
//! a node type comes from a [`CapabilityDescriptor`] fetched through the
//! read-only [`CapabilityProvider`] boundary. Descriptors are loaded once by
//! the surrounding service and treated as immutable for the process
//! lifetime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One declared output branch of a node type.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OutputBranch {
    pub name: String,
    pub index: usize,
}

/// Per-type metadata consumed by the validator and suggestion service.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    /// Declared output branches, ordered; index 0 is the first output.
    #[serde(default)]
    pub outputs: Vec<OutputBranch>,
    /// Legitimate workflow entry point.
    #[serde(default)]
    pub trigger: bool,
    /// A path from one of this node's branches back to itself is permitted.
    #[serde(default)]
    pub loop_support: bool,
    /// May terminate an `ai_tool` connection.
    #[serde(default)]
    pub usable_as_tool: bool,
    #[serde(default)]
    pub known_resources: Vec<String>,
    #[serde(default)]
    pub operations_by_resource: HashMap<String, Vec<String>>,
}

impl CapabilityDescriptor {
    /// Number of declared output branches; types without declared outputs
    /// are treated as having a single `main` output.
    pub fn output_count(&self) -> usize {
        self.outputs.len().max(1)
    }

    /// Branch index of the output with the given name, if declared.
    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().find(|o| o.name == name).map(|o| o.index)
    }

    /// The branch a loop-capable type loops from: the output named `loop`.
    pub fn loop_branch(&self) -> Option<usize> {
        if self.loop_support {
            self.output_index("loop")
        } else {
            None
        }
    }
}

/// Read-only lookup from node type identifier to capability descriptor.
pub trait CapabilityProvider {
    fn get(&self, node_type: &str) -> Option<&CapabilityDescriptor>;
}

/// In-memory provider backed by a map, filled once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilityProvider {
    descriptors: HashMap<String, CapabilityDescriptor>,
}

impl StaticCapabilityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, node_type: impl Into<String>, descriptor: CapabilityDescriptor) {
        self.descriptors.insert(node_type.into(), descriptor);
    }

    pub fn with(mut self, node_type: impl Into<String>, descriptor: CapabilityDescriptor) -> Self {
        self.register(node_type, descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl CapabilityProvider for StaticCapabilityProvider {
    fn get(&self, node_type: &str) -> Option<&CapabilityDescriptor> {
        self.descriptors.get(node_type)
    }
}

/// Build an ordered output list from branch names.
pub fn outputs(names: &[&str]) -> Vec<OutputBranch> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| OutputBranch {
            name: (*name).to_string(),
            index,
        })
        .collect()
}
