//! Two-pass transactional patch application.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::capability::CapabilityProvider;
use crate::error::{EngineError, EngineResult};
use crate::schema::{ConnectionTarget, Workflow, CATEGORY_MAIN};
use crate::validation::{ValidationReport, Validator};

use super::operations::DiffOperation;

/// Request options.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DiffOptions {
    /// Run both passes against the scratch copy but never commit.
    pub validate_only: bool,
    /// Skip failing operations instead of aborting the whole batch.
    pub continue_on_error: bool,
}

/// A successfully applied operation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedOperation {
    /// Position in the submitted batch.
    pub index: usize,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An operation rejected against the current mutated state.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailedOperation {
    pub index: usize,
    pub kind: String,
    pub error: String,
}

/// Outcome of one diff request.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub success: bool,
    /// The mutated snapshot; absent on abort and in validate-only mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
    pub applied_count: usize,
    pub applied: Vec<AppliedOperation>,
    pub failed: Vec<FailedOperation>,
    /// Convenience aggregation of the failed operations' errors.
    pub errors: Vec<String>,
    /// Connections-only report of the committed result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
}

/// Applies patch batches to workflow snapshots with all-or-nothing
/// semantics.
///
/// Each call clones the snapshot once, mutates the clone across both
/// passes, and either hands it back or discards it; no state survives
/// between requests.
pub struct DiffEngine<'a> {
    provider: &'a dyn CapabilityProvider,
    validator: Validator<'a>,
}

impl<'a> DiffEngine<'a> {
    pub fn new(provider: &'a dyn CapabilityProvider) -> Self {
        Self {
            provider,
            validator: Validator::new(provider),
        }
    }

    /// Apply a batch of operations to a snapshot.
    ///
    /// Pass 1 applies node-lifecycle operations in submission order, pass 2
    /// the relational and metadata operations, so ordering across the two
    /// groups does not matter within one request. Every operation is
    /// checked against the state produced by the operations before it.
    pub fn apply(
        &self,
        workflow: &Workflow,
        operations: &[DiffOperation],
        options: &DiffOptions,
    ) -> DiffResult {
        let mut draft = workflow.clone();
        let mut applied = Vec::new();
        let mut failed = Vec::new();

        // Pass 1: node lifecycle. Pass 2: relational and metadata.
        self.run_pass(&mut draft, operations, true, &mut applied, &mut failed);
        self.run_pass(&mut draft, operations, false, &mut applied, &mut failed);

        let errors: Vec<String> = failed.iter().map(|f| f.error.clone()).collect();

        if !failed.is_empty() && !options.continue_on_error {
            // Abort: the draft is discarded wholesale, nothing was applied.
            return DiffResult {
                success: false,
                workflow: None,
                applied_count: 0,
                applied: Vec::new(),
                failed,
                errors,
                validation: None,
            };
        }

        if options.validate_only {
            return DiffResult {
                success: true,
                workflow: None,
                applied_count: applied.len(),
                applied,
                failed,
                errors,
                validation: None,
            };
        }

        let validation = (!applied.is_empty())
            .then(|| self.validator.validate_connections_only(&draft));

        DiffResult {
            success: true,
            workflow: Some(draft),
            applied_count: applied.len(),
            applied,
            failed,
            errors,
            validation,
        }
    }

    /// Boundary helper for the transport layer: plain JSON in, typed result
    /// out. Shape failures are the only hard errors of the engine.
    pub fn apply_json(
        &self,
        workflow: Value,
        operations: Value,
        options: Value,
    ) -> EngineResult<DiffResult> {
        let workflow: Workflow = serde_json::from_value(workflow)
            .map_err(|e| EngineError::InvalidSnapshot(e.to_string()))?;
        let operations: Vec<DiffOperation> = serde_json::from_value(operations)
            .map_err(|e| EngineError::InvalidOperations(e.to_string()))?;
        let options: DiffOptions = serde_json::from_value(options)
            .map_err(|e| EngineError::InvalidOptions(e.to_string()))?;
        Ok(self.apply(&workflow, &operations, &options))
    }

    fn run_pass(
        &self,
        draft: &mut Workflow,
        operations: &[DiffOperation],
        node_pass: bool,
        applied: &mut Vec<AppliedOperation>,
        failed: &mut Vec<FailedOperation>,
    ) {
        for (index, op) in operations
            .iter()
            .enumerate()
            .filter(|(_, op)| op.is_node_op() == node_pass)
        {
            match self.apply_one(draft, op) {
                Ok(()) => {
                    debug!(index, kind = op.kind(), "operation applied");
                    applied.push(AppliedOperation {
                        index,
                        kind: op.kind().to_string(),
                        description: op.description().map(str::to_string),
                    });
                }
                Err(error) => {
                    warn!(index, kind = op.kind(), %error, "operation rejected");
                    failed.push(FailedOperation {
                        index,
                        kind: op.kind().to_string(),
                        error,
                    });
                }
            }
        }
    }

    fn apply_one(&self, draft: &mut Workflow, op: &DiffOperation) -> Result<(), String> {
        match op {
            DiffOperation::AddNode { node, .. } => self.add_node(draft, node),
            DiffOperation::RemoveNode { name, .. } => remove_node(draft, name),
            DiffOperation::UpdateNode {
                name, parameters, ..
            } => {
                let node = draft
                    .get_node_mut(name)
                    .ok_or_else(|| format!("no node named '{}'", name))?;
                for (key, value) in parameters {
                    node.parameters.insert(key.clone(), value.clone());
                }
                Ok(())
            }
            DiffOperation::MoveNode { name, position, .. } => {
                let node = draft
                    .get_node_mut(name)
                    .ok_or_else(|| format!("no node named '{}'", name))?;
                node.position = *position;
                Ok(())
            }
            DiffOperation::SetEnabled { name, enabled, .. } => {
                let node = draft
                    .get_node_mut(name)
                    .ok_or_else(|| format!("no node named '{}'", name))?;
                node.disabled = !enabled;
                Ok(())
            }
            DiffOperation::AddConnection {
                source,
                target,
                category,
                branch,
                input,
                ..
            } => self.add_connection(draft, source, target, category, *branch, *input),
            DiffOperation::RemoveConnection {
                source,
                target,
                category,
                branch,
                ..
            } => remove_connection(draft, source, target, category, *branch),
            DiffOperation::RewireConnection {
                source,
                category,
                branch,
                from,
                to,
                ..
            } => rewire_connection(draft, source, category, *branch, from, to),
            DiffOperation::UpdateSettings { settings, .. } => {
                for (key, value) in settings {
                    draft.settings.insert(key.clone(), value.clone());
                }
                Ok(())
            }
            DiffOperation::RenameWorkflow { name, .. } => {
                draft.name = name.clone();
                Ok(())
            }
            DiffOperation::AddTag { tag, .. } => {
                if !draft.tags.iter().any(|t| t == tag) {
                    draft.tags.push(tag.clone());
                }
                Ok(())
            }
            DiffOperation::RemoveTag { tag, .. } => {
                let pos = draft
                    .tags
                    .iter()
                    .position(|t| t == tag)
                    .ok_or_else(|| format!("tag '{}' not found", tag))?;
                draft.tags.remove(pos);
                Ok(())
            }
        }
    }

    fn add_node(&self, draft: &mut Workflow, node: &crate::schema::Node) -> Result<(), String> {
        if node.name.trim().is_empty() {
            return Err("node name is empty".to_string());
        }
        if draft.has_node(&node.name) {
            return Err(format!("a node named '{}' already exists", node.name));
        }
        if self.provider.get(&node.node_type).is_none() {
            return Err(format!("unknown node type: {}", node.node_type));
        }
        draft.nodes.push(node.clone());
        Ok(())
    }

    fn add_connection(
        &self,
        draft: &mut Workflow,
        source: &str,
        target: &str,
        category: &str,
        branch: usize,
        input: u32,
    ) -> Result<(), String> {
        let source_node = draft
            .get_node(source)
            .ok_or_else(|| format!("source node '{}' does not exist", source))?;
        if !draft.has_node(target) {
            return Err(format!("target node '{}' does not exist", target));
        }

        if category == CATEGORY_MAIN {
            if let Some(descriptor) = self.provider.get(&source_node.node_type) {
                let allowed = descriptor.output_count().max(2);
                if branch >= allowed {
                    return Err(format!(
                        "branch index {} out of range for '{}' ({} declares {} outputs)",
                        branch,
                        source,
                        source_node.node_type,
                        descriptor.output_count()
                    ));
                }
            }
        }

        let branches = draft
            .connections
            .entry(source.to_string())
            .or_default()
            .entry(category.to_string())
            .or_default();
        while branches.len() <= branch {
            branches.push(Vec::new());
        }
        if branches[branch]
            .iter()
            .any(|t| t.node == target && t.index == input)
        {
            return Err(format!(
                "connection {} {}[{}] -> {} already exists",
                source, category, branch, target
            ));
        }
        branches[branch].push(ConnectionTarget {
            node: target.to_string(),
            connection_type: category.to_string(),
            index: input,
        });
        Ok(())
    }
}

fn remove_node(draft: &mut Workflow, name: &str) -> Result<(), String> {
    let pos = draft
        .nodes
        .iter()
        .position(|n| n.name == name)
        .ok_or_else(|| format!("no node named '{}'", name))?;
    draft.nodes.remove(pos);

    // Drop every connection referencing the node so later operations see a
    // consistent map.
    draft.connections.remove(name);
    for by_category in draft.connections.values_mut() {
        for branches in by_category.values_mut() {
            for targets in branches.iter_mut() {
                targets.retain(|t| t.node != name);
            }
        }
    }
    prune_connections(draft);
    Ok(())
}

fn remove_connection(
    draft: &mut Workflow,
    source: &str,
    target: &str,
    category: &str,
    branch: Option<usize>,
) -> Result<(), String> {
    let by_category = draft
        .connections
        .get_mut(source)
        .ok_or_else(|| format!("no connections from '{}'", source))?;
    let branches = by_category
        .get_mut(category)
        .ok_or_else(|| format!("no '{}' connections from '{}'", category, source))?;

    let range: Vec<usize> = match branch {
        Some(b) if b < branches.len() => vec![b],
        Some(b) => {
            return Err(format!(
                "branch index {} out of range for '{}' ({} branches)",
                b,
                source,
                branches.len()
            ))
        }
        None => (0..branches.len()).collect(),
    };

    let mut found = None;
    for b in range {
        if let Some(pos) = branches[b].iter().position(|t| t.node == target) {
            found = Some((b, pos));
            break;
        }
    }

    let Some((b, pos)) = found else {
        return Err(format!(
            "no connection from '{}' to '{}' in '{}'",
            source, target, category
        ));
    };
    branches[b].remove(pos);
    prune_connections(draft);
    Ok(())
}

fn rewire_connection(
    draft: &mut Workflow,
    source: &str,
    category: &str,
    branch: usize,
    from: &str,
    to: &str,
) -> Result<(), String> {
    if !draft.has_node(to) {
        return Err(format!("target node '{}' does not exist", to));
    }
    let branches = draft
        .connections
        .get_mut(source)
        .and_then(|by_category| by_category.get_mut(category))
        .ok_or_else(|| format!("no '{}' connections from '{}'", category, source))?;
    let targets = branches
        .get_mut(branch)
        .ok_or_else(|| format!("branch index {} out of range for '{}'", branch, source))?;
    let slot = targets
        .iter_mut()
        .find(|t| t.node == from)
        .ok_or_else(|| {
            format!(
                "no connection from '{}' to '{}' in '{}'[{}]",
                source, from, category, branch
            )
        })?;
    slot.node = to.to_string();
    Ok(())
}

/// Drop trailing empty branches and empty map entries so that adding and
/// then removing a connection restores the original map shape.
fn prune_connections(draft: &mut Workflow) {
    for by_category in draft.connections.values_mut() {
        by_category.retain(|_, branches| {
            while branches.last().map(|t| t.is_empty()).unwrap_or(false) {
                branches.pop();
            }
            !branches.is_empty()
        });
    }
    draft.connections.retain(|_, by_category| !by_category.is_empty());
}
