//! Semantic checks: error-output consistency, tool wiring, parameter
//! vocabulary.

use std::collections::HashSet;

use crate::capability::CapabilityProvider;
use crate::graph::{reachable_within, upstream_of, WorkflowGraph};
use crate::schema::{OnError, Workflow, CATEGORY_AI_TOOL, CATEGORY_MAIN, ERROR_BRANCH};
use crate::suggest::SuggestionService;

use super::types::{Finding, Severity};
use super::{Scope, ValidatorOptions};

pub(super) fn validate(
    workflow: &Workflow,
    graph: &WorkflowGraph,
    provider: &dyn CapabilityProvider,
    suggestions: &SuggestionService<'_>,
    options: &ValidatorOptions,
    scope: Scope,
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

        // Error-output consistency. Only single-output types grow an error
        // branch at main[1]; for multi-output types that slot is a declared
        // output.
        if descriptor.output_count() <= 1 {
            let error_populated = workflow
                .connections
                .get(&node.name)
                .and_then(|by_category| by_category.get(CATEGORY_MAIN))
                .and_then(|branches| branches.get(ERROR_BRANCH))
                .map(|targets| !targets.is_empty())
                .unwrap_or(false);

            if node.on_error == OnError::ContinueErrorOutput && !error_populated {
                findings.push(error(
                    "E301",
                    format!(
                        "Node '{}' is set to continueErrorOutput but has no connections on its error output",
                        node.name
                    ),
                    Some(node.name.clone()),
                ));
            }
            if error_populated && node.on_error != OnError::ContinueErrorOutput {
                findings.push(error(
                    "E302",
                    format!(
                        "Node '{}' has connections on its error output but onError is not continueErrorOutput",
                        node.name
                    ),
                    Some(node.name.clone()),
                ));
            }
        }

        if scope == Scope::Full {
            findings.extend(check_vocabulary(node, descriptor, suggestions, options));
        }
    }

    findings.extend(check_tool_connections(workflow, provider));
    findings.extend(check_misplaced_handlers(workflow, graph, options));

    findings
}

/// Any `ai_tool` connection must terminate at a tool-capable node.
fn check_tool_connections(
    workflow: &Workflow,
    provider: &dyn CapabilityProvider,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for conn in workflow.iter_connections() {
        if conn.category != CATEGORY_AI_TOOL {
            continue;
        }
        let Some(target) = workflow.get_node(&conn.target.node) else {
            continue;
        };
        let Some(descriptor) = provider.get(&target.node_type) else {
            continue;
        };
        if !descriptor.usable_as_tool {
            findings.push(error(
                "E303",
                format!(
                    "Node '{}' is connected as an AI tool but type '{}' is not usable as a tool",
                    target.name, target.node_type
                ),
                Some(target.name.clone()),
            ));
        }
    }

    findings
}

/// Error handlers fanned out on the first `main` branch that feed back into
/// the flow they hang off: the outputs were almost certainly meant to be an
/// error branch.
fn check_misplaced_handlers(
    workflow: &Workflow,
    graph: &WorkflowGraph,
    options: &ValidatorOptions,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen = HashSet::new();

    for node in &workflow.nodes {
        if !seen.insert(node.name.as_str()) {
            continue;
        }
        let targets = graph.targets_of_branch(&node.name, CATEGORY_MAIN, 0);
        if targets.len() < 2 {
            continue;
        }

        let upstream = upstream_of(graph, &node.name);
        for target in targets {
            let Some(target_node) = workflow.get_node(target) else {
                continue;
            };
            if !(options.error_handler_classifier)(target_node) {
                continue;
            }
            let forward = reachable_within(graph, target, options.max_loop_depth);
            if forward.iter().any(|name| upstream.contains(name)) {
                findings.push(Finding {
                    severity: Severity::Warning,
                    code: "W301".to_string(),
                    message: format!(
                        "Outputs of '{}' appear reversed: '{}' looks like an error handler but is wired to the main output",
                        node.name, target
                    ),
                    node: Some(node.name.clone()),
                    suggestion: None,
                });
            }
        }
    }

    findings
}

/// Classify `resource`/`operation` parameters against the type vocabulary,
/// attaching the top similarity suggestion when it is confident enough.
fn check_vocabulary(
    node: &crate::schema::Node,
    descriptor: &crate::capability::CapabilityDescriptor,
    suggestions: &SuggestionService<'_>,
    options: &ValidatorOptions,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let resource = node.parameters.get("resource").and_then(|v| v.as_str());
    let mut resource_context: Option<&str> = None;

    if !descriptor.known_resources.is_empty() {
        if let Some(value) = resource {
            if descriptor.known_resources.iter().any(|r| r == value) {
                resource_context = Some(value);
            } else {
                let suggestion = suggestions
                    .suggest_resource(&node.node_type, value, 1)
                    .into_iter()
                    .next()
                    .filter(|s| s.confidence >= options.suggestion_threshold);
                findings.push(Finding {
                    severity: Severity::Error,
                    code: "E304".to_string(),
                    message: format!(
                        "Invalid resource '{}' for node type '{}'",
                        value, node.node_type
                    ),
                    node: Some(node.name.clone()),
                    suggestion,
                });
            }
        }
    }

    if !descriptor.operations_by_resource.is_empty() {
        if let Some(value) = node.parameters.get("operation").and_then(|v| v.as_str()) {
            let known = match resource_context {
                Some(context) => descriptor
                    .operations_by_resource
                    .get(context)
                    .map(|ops| ops.iter().any(|o| o == value))
                    // Resource is valid but carries no vocabulary; nothing
                    // to classify against.
                    .unwrap_or(true),
                None => descriptor
                    .operations_by_resource
                    .values()
                    .flatten()
                    .any(|o| o == value),
            };

            if !known {
                let suggestion = suggestions
                    .suggest_operation(&node.node_type, value, resource_context, 1)
                    .into_iter()
                    .next()
                    .filter(|s| s.confidence >= options.suggestion_threshold);
                let message = match resource_context {
                    Some(context) => format!(
                        "Invalid operation '{}' for resource '{}' of node type '{}'",
                        value, context, node.node_type
                    ),
                    None => format!(
                        "Invalid operation '{}' for node type '{}'",
                        value, node.node_type
                    ),
                };
                findings.push(Finding {
                    severity: Severity::Error,
                    code: "E305".to_string(),
                    message,
                    node: Some(node.name.clone()),
                    suggestion,
                });
            }
        }
    }

    findings
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
