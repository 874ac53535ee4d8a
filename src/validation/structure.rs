//! Structural checks: node identity, type resolution, connection endpoints,
//! branch classification.

use std::collections::HashSet;

use crate::capability::CapabilityProvider;
use crate::graph::{MissingEnd, WorkflowGraph};
use crate::schema::{Workflow, CATEGORY_MAIN};

use super::types::{Finding, Severity};

/// Returns the findings plus the number of valid connections.
pub(super) fn validate(
    workflow: &Workflow,
    graph: &WorkflowGraph,
    provider: &dyn CapabilityProvider,
) -> (Vec<Finding>, usize) {
    let mut findings = Vec::new();

    let mut names = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for node in &workflow.nodes {
        if node.name.trim().is_empty() {
            findings.push(error(
                "E101",
                "Node name is empty".to_string(),
                Some(node.name.clone()),
            ));
        }
        if !names.insert(node.name.clone()) && !duplicates.contains(&node.name) {
            duplicates.push(node.name.clone());
        }
        if provider.get(&node.node_type).is_none() {
            findings.push(error(
                "E103",
                format!("Unknown node type: {}", node.node_type),
                Some(node.name.clone()),
            ));
        }
    }

    for dup in duplicates {
        findings.push(error(
            "E102",
            format!("Duplicate node name: {}", dup),
            Some(dup),
        ));
    }

    for dangling in &graph.dangling {
        match dangling.end {
            MissingEnd::Source => findings.push(error(
                "E104",
                format!(
                    "Connection source not found: {} ({}[{}] -> {})",
                    dangling.source, dangling.category, dangling.branch, dangling.target
                ),
                None,
            )),
            MissingEnd::Target => findings.push(error(
                "E105",
                format!(
                    "Connection target not found: {} ({} {}[{}] -> ?)",
                    dangling.target, dangling.source, dangling.category, dangling.branch
                ),
                Some(dangling.source.clone()),
            )),
        }
    }

    // Branch classification against the source type's declared outputs.
    let mut valid_connections = 0;
    for conn in workflow.iter_connections() {
        if !workflow.has_node(conn.source) || !workflow.has_node(&conn.target.node) {
            continue;
        }
        let mut branch_ok = true;
        if conn.category == CATEGORY_MAIN {
            if let Some(source) = workflow.get_node(conn.source) {
                if let Some(descriptor) = provider.get(&source.node_type) {
                    // An extra error branch is legitimate on single-output
                    // types; the semantic layer checks its consistency.
                    let allowed = descriptor.output_count().max(2);
                    if conn.branch >= allowed {
                        branch_ok = false;
                        findings.push(error(
                            "E106",
                            format!(
                                "Branch index {} out of range for {} ({} declares {} outputs)",
                                conn.branch,
                                conn.source,
                                source.node_type,
                                descriptor.output_count()
                            ),
                            Some(conn.source.to_string()),
                        ));
                    }
                }
            }
        }
        if branch_ok {
            valid_connections += 1;
        }
    }

    (findings, valid_connections)
}

fn error(code: &str, message: String, node: Option<String>) -> Finding {
    Finding {
        severity: Severity::Error,
        code: code.to_string(),
        message,
        node,
        suggestion: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{outputs, CapabilityDescriptor, StaticCapabilityProvider};
    use serde_json::json;

    fn provider() -> StaticCapabilityProvider {
        StaticCapabilityProvider::new()
            .with("webhook", CapabilityDescriptor {
                trigger: true,
                ..Default::default()
            })
            .with("set", CapabilityDescriptor::default())
            .with("splitInBatches", CapabilityDescriptor {
                outputs: outputs(&["done", "loop"]),
                loop_support: true,
                ..Default::default()
            })
    }

    fn run(json: serde_json::Value) -> (Vec<Finding>, usize) {
        let wf: Workflow = serde_json::from_value(json).unwrap();
        let graph = WorkflowGraph::build(&wf);
        validate(&wf, &graph, &provider())
    }

    #[test]
    fn test_clean_workflow_has_no_findings() {
        let (findings, valid) = run(json!({
            "name": "t",
            "nodes": [
                {"name": "A", "type": "webhook"},
                {"name": "B", "type": "set"}
            ],
            "connections": {"A": {"main": [[{"node": "B"}]]}}
        }));
        assert!(findings.is_empty());
        assert_eq!(valid, 1);
    }

    #[test]
    fn test_duplicate_names() {
        let (findings, _) = run(json!({
            "name": "t",
            "nodes": [
                {"name": "A", "type": "set"},
                {"name": "A", "type": "set"}
            ]
        }));
        assert!(findings.iter().any(|f| f.code == "E102"));
    }

    #[test]
    fn test_unknown_node_type_is_error() {
        let (findings, _) = run(json!({
            "name": "t",
            "nodes": [{"name": "A", "type": "mystery"}]
        }));
        let finding = findings.iter().find(|f| f.code == "E103").unwrap();
        assert_eq!(finding.severity, Severity::Error);
        assert!(finding.message.contains("mystery"));
    }

    #[test]
    fn test_missing_endpoints() {
        let (findings, valid) = run(json!({
            "name": "t",
            "nodes": [{"name": "A", "type": "set"}],
            "connections": {
                "A": {"main": [[{"node": "Ghost"}]]},
                "Phantom": {"main": [[{"node": "A"}]]}
            }
        }));
        assert!(findings.iter().any(|f| f.code == "E104"));
        assert!(findings.iter().any(|f| f.code == "E105"));
        assert_eq!(valid, 0);
    }

    #[test]
    fn test_branch_index_out_of_range() {
        let (findings, valid) = run(json!({
            "name": "t",
            "nodes": [
                {"name": "Split", "type": "splitInBatches"},
                {"name": "B", "type": "set"}
            ],
            "connections": {
                "Split": {"main": [[], [], [{"node": "B"}]]}
            }
        }));
        let finding = findings.iter().find(|f| f.code == "E106").unwrap();
        assert!(finding.message.contains("declares 2 outputs"));
        assert_eq!(valid, 0);
    }

    #[test]
    fn test_error_branch_on_single_output_type_is_in_range() {
        let (findings, valid) = run(json!({
            "name": "t",
            "nodes": [
                {"name": "A", "type": "set", "onError": "continueErrorOutput"},
                {"name": "B", "type": "set"}
            ],
            "connections": {
                "A": {"main": [[], [{"node": "B"}]]}
            }
        }));
        assert!(findings.is_empty());
        assert_eq!(valid, 1);
    }

    #[test]
    fn test_empty_node_name() {
        let (findings, _) = run(json!({
            "name": "t",
            "nodes": [{"name": "  ", "type": "set"}]
        }));
        assert!(findings.iter().any(|f| f.code == "E101"));
    }
}
