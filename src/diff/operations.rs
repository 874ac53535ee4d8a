//! Typed patch operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{Node, CATEGORY_MAIN};

fn default_category() -> String {
    CATEGORY_MAIN.to_string()
}

/// One requested workflow mutation.
///
/// Node-lifecycle variants apply in pass 1, relational/metadata variants in
/// pass 2, so a request may reference nodes it creates later in the batch.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiffOperation {
    AddNode {
        node: Node,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    RemoveNode {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    UpdateNode {
        name: String,
        /// Shallow-merged into the node's parameter blob.
        parameters: HashMap<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    MoveNode {
        name: String,
        position: [f64; 2],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    SetEnabled {
        name: String,
        enabled: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    AddConnection {
        source: String,
        target: String,
        #[serde(default = "default_category")]
        category: String,
        /// Output branch index on the source node.
        #[serde(default)]
        branch: usize,
        /// Input index on the target node.
        #[serde(default)]
        input: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    RemoveConnection {
        source: String,
        target: String,
        #[serde(default = "default_category")]
        category: String,
        /// Restrict the removal to one branch; all branches otherwise.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// Atomically replace one edge's target; the graph is never observable
    /// with the edge half-removed.
    RewireConnection {
        source: String,
        #[serde(default = "default_category")]
        category: String,
        #[serde(default)]
        branch: usize,
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    UpdateSettings {
        /// Shallow-merged into the settings blob.
        settings: HashMap<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    RenameWorkflow {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    AddTag {
        tag: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    RemoveTag {
        tag: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl DiffOperation {
    /// Wire name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            DiffOperation::AddNode { .. } => "addNode",
            DiffOperation::RemoveNode { .. } => "removeNode",
            DiffOperation::UpdateNode { .. } => "updateNode",
            DiffOperation::MoveNode { .. } => "moveNode",
            DiffOperation::SetEnabled { .. } => "setEnabled",
            DiffOperation::AddConnection { .. } => "addConnection",
            DiffOperation::RemoveConnection { .. } => "removeConnection",
            DiffOperation::RewireConnection { .. } => "rewireConnection",
            DiffOperation::UpdateSettings { .. } => "updateSettings",
            DiffOperation::RenameWorkflow { .. } => "renameWorkflow",
            DiffOperation::AddTag { .. } => "addTag",
            DiffOperation::RemoveTag { .. } => "removeTag",
        }
    }

    /// Node-lifecycle operations run in pass 1.
    pub fn is_node_op(&self) -> bool {
        matches!(
            self,
            DiffOperation::AddNode { .. }
                | DiffOperation::RemoveNode { .. }
                | DiffOperation::UpdateNode { .. }
                | DiffOperation::MoveNode { .. }
                | DiffOperation::SetEnabled { .. }
        )
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            DiffOperation::AddNode { description, .. }
            | DiffOperation::RemoveNode { description, .. }
            | DiffOperation::UpdateNode { description, .. }
            | DiffOperation::MoveNode { description, .. }
            | DiffOperation::SetEnabled { description, .. }
            | DiffOperation::AddConnection { description, .. }
            | DiffOperation::RemoveConnection { description, .. }
            | DiffOperation::RewireConnection { description, .. }
            | DiffOperation::UpdateSettings { description, .. }
            | DiffOperation::RenameWorkflow { description, .. }
            | DiffOperation::AddTag { description, .. }
            | DiffOperation::RemoveTag { description, .. } => description.as_deref(),
        }
    }
}
