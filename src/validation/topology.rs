//! Topology checks: trigger presence, connectivity, cycles, loop-backs.

use std::collections::HashSet;

use crate::capability::CapabilityProvider;
use crate::graph::{connects_back, find_cycles, reachable_from, WorkflowGraph};
use crate::schema::{Workflow, CATEGORY_MAIN};

use super::types::{Finding, Severity};
use super::ValidatorOptions;

pub(super) fn validate(
    workflow: &Workflow,
    graph: &WorkflowGraph,
    provider: &dyn CapabilityProvider,
    options: &ValidatorOptions,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let mut seen = HashSet::new();
    let mut triggers: Vec<&str> = Vec::new();
    let mut isolated: HashSet<&str> = HashSet::new();

    for node in &workflow.nodes {
        if !seen.insert(node.name.as_str()) {
            continue;
        }
        let is_trigger = provider
            .get(&node.node_type)
            .map(|d| d.trigger)
            .unwrap_or(false);
        if is_trigger {
            triggers.push(node.name.as_str());
            continue;
        }
        if !graph.has_incoming(&node.name) && !graph.has_outgoing(&node.name) {
            isolated.insert(node.name.as_str());
            findings.push(warn(
                "W102",
                format!("{} is not connected to any other nodes", node.name),
                Some(node.name.clone()),
            ));
        }
    }

    if triggers.is_empty() {
        findings.push(warn(
            "W101",
            "No trigger-capable node found".to_string(),
            None,
        ));
    } else {
        // Orphans: unreachable from every trigger. Isolated nodes are
        // already reported above.
        let reachable = reachable_from(graph, &triggers);
        for node in &workflow.nodes {
            if triggers.contains(&node.name.as_str()) || isolated.contains(node.name.as_str()) {
                continue;
            }
            if !reachable.contains(&node.name) {
                findings.push(warn(
                    "W103",
                    format!("Node '{}' is not reachable from any trigger node", node.name),
                    Some(node.name.clone()),
                ));
            }
        }
    }

    findings.extend(check_cycles(graph, provider));
    findings.extend(check_loop_backs(workflow, graph, provider, options));

    findings
}

fn check_cycles(graph: &WorkflowGraph, provider: &dyn CapabilityProvider) -> Vec<Finding> {
    let mut findings = Vec::new();

    for cycle in find_cycles(graph) {
        let loop_capable = |name: &str| {
            graph
                .get_node(name)
                .and_then(|n| provider.get(&n.node_type))
                .map(|d| d.loop_support)
                .unwrap_or(false)
        };

        if cycle.len() == 1 {
            let name = &cycle[0];
            // A self-loop is fine when it sits on the loop branch of a
            // loop-capable node.
            let on_loop_branch = graph
                .get_node(name)
                .and_then(|n| provider.get(&n.node_type))
                .and_then(|d| d.loop_branch())
                .map(|branch| {
                    graph
                        .targets_of_branch(name, CATEGORY_MAIN, branch)
                        .contains(&name.as_str())
                })
                .unwrap_or(false);
            if !on_loop_branch {
                findings.push(warn(
                    "W202",
                    format!("Node '{}' connects to itself", name),
                    Some(name.clone()),
                ));
            }
            continue;
        }

        if cycle.iter().any(|name| loop_capable(name)) {
            // Paths back to a loop-capable node are its loop mechanism;
            // the loop-back check judges them.
            continue;
        }

        let mut path = cycle.clone();
        path.push(cycle[0].clone());
        findings.push(Finding {
            severity: Severity::Error,
            code: "E201".to_string(),
            message: format!("Cycle detected: {}", path.join(" -> ")),
            node: Some(cycle[0].clone()),
            suggestion: None,
        });
    }

    findings
}

fn check_loop_backs(
    workflow: &Workflow,
    graph: &WorkflowGraph,
    provider: &dyn CapabilityProvider,
    options: &ValidatorOptions,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen = HashSet::new();

    for node in &workflow.nodes {
        if !seen.insert(node.name.as_str()) {
            continue;
        }
        let Some(descriptor) = provider.get(&node.node_type) else {
            continue;
        };
        let Some(loop_branch) = descriptor.loop_branch() else {
            continue;
        };

        if connects_back(
            graph,
            &node.name,
            CATEGORY_MAIN,
            loop_branch,
            options.max_loop_depth,
        ) {
            continue;
        }

        // The loop output never returns. If another declared output does,
        // the two are almost certainly swapped.
        let reversed_via = descriptor
            .outputs
            .iter()
            .filter(|output| output.index != loop_branch)
            .find(|output| {
                connects_back(
                    graph,
                    &node.name,
                    CATEGORY_MAIN,
                    output.index,
                    options.max_loop_depth,
                )
            });

        match reversed_via {
            Some(output) => findings.push(Finding {
                severity: Severity::Error,
                code: "E202".to_string(),
                message: format!(
                    "{} outputs appear reversed: '{}' connects back to '{}' but 'loop' does not",
                    short_type_name(&node.node_type),
                    output.name,
                    node.name
                ),
                node: Some(node.name.clone()),
                suggestion: None,
            }),
            None => findings.push(warn(
                "W201",
                format!(
                    "'loop' output of '{}' does not connect back to it within {} nodes",
                    node.name, options.max_loop_depth
                ),
                Some(node.name.clone()),
            )),
        }
    }

    findings
}

/// Display form of a type identifier: last path segment, capitalized.
fn short_type_name(node_type: &str) -> String {
    let segment = node_type.rsplit('.').next().unwrap_or(node_type);
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => segment.to_string(),
    }
}

fn warn(code: &str, message: String, node: Option<String>) -> Finding {
    Finding {
        severity: Severity::Warning,
        code: code.to_string(),
        message,
        node,
        suggestion: None,
    }
}
