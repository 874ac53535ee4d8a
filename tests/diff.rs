mod common;

use common::{capabilities, workflow};
use flowpatch::{DiffEngine, DiffOperation, DiffOptions, Workflow};
use serde_json::json;

fn ops(json: serde_json::Value) -> Vec<DiffOperation> {
    serde_json::from_value(json).unwrap()
}

fn base_workflow() -> Workflow {
    workflow(json!({
        "name": "demo",
        "nodes": [
            {"name": "Webhook", "type": "webhook"},
            {"name": "HTTP Request", "type": "httpRequest"}
        ],
        "connections": {
            "Webhook": {"main": [[{"node": "HTTP Request", "type": "main", "index": 0}]]}
        },
        "tags": ["prod"]
    }))
}

#[test]
fn empty_batch_returns_equal_workflow() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();
    let result = engine.apply(&wf, &[], &DiffOptions::default());
    assert!(result.success);
    assert_eq!(result.applied_count, 0);
    assert_eq!(result.workflow.unwrap(), wf);
}

#[test]
fn add_then_remove_connection_is_inverse() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();

    let added = engine
        .apply(
            &wf,
            &ops(json!([{"type": "addConnection", "source": "HTTP Request",
                         "target": "Webhook", "category": "error"}])),
            &DiffOptions::default(),
        )
        .workflow
        .unwrap();
    assert_eq!(added.connection_count(), 2);

    let removed = engine
        .apply(
            &added,
            &ops(json!([{"type": "removeConnection", "source": "HTTP Request",
                         "target": "Webhook", "category": "error"}])),
            &DiffOptions::default(),
        )
        .workflow
        .unwrap();
    assert_eq!(removed.connections, wf.connections);
}

#[test]
fn operation_order_across_passes_does_not_matter() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();

    let connect_first = ops(json!([
        {"type": "addConnection", "source": "HTTP Request", "target": "Transform"},
        {"type": "addNode", "node": {"name": "Transform", "type": "set"}}
    ]));
    let node_first = ops(json!([
        {"type": "addNode", "node": {"name": "Transform", "type": "set"}},
        {"type": "addConnection", "source": "HTTP Request", "target": "Transform"}
    ]));

    let first = engine.apply(&wf, &connect_first, &DiffOptions::default());
    let second = engine.apply(&wf, &node_first, &DiffOptions::default());

    assert!(first.success, "errors: {:?}", first.errors);
    assert!(second.success);
    assert_eq!(first.workflow.unwrap(), second.workflow.unwrap());
}

#[test]
fn strict_mode_discards_everything_on_failure() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();

    let result = engine.apply(
        &wf,
        &ops(json!([
            {"type": "renameWorkflow", "name": "renamed"},
            {"type": "removeNode", "name": "Nonexistent"},
            {"type": "addTag", "tag": "touched"}
        ])),
        &DiffOptions::default(),
    );

    assert!(!result.success);
    assert_eq!(result.applied_count, 0);
    assert!(result.applied.is_empty());
    assert!(result.workflow.is_none());
    assert_eq!(result.failed.len(), 1);
    assert!(result.failed[0].error.contains("Nonexistent"));
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn continue_on_error_applies_the_rest() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();

    let result = engine.apply(
        &wf,
        &ops(json!([
            {"type": "renameWorkflow", "name": "renamed"},
            {"type": "removeNode", "name": "Nonexistent"},
            {"type": "addTag", "tag": "touched"}
        ])),
        &DiffOptions {
            continue_on_error: true,
            ..Default::default()
        },
    );

    assert!(result.success);
    assert_eq!(result.applied_count, 2);
    let applied_indices: Vec<usize> = result.applied.iter().map(|a| a.index).collect();
    assert!(applied_indices.contains(&0));
    assert!(applied_indices.contains(&2));
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].index, 1);
    assert!(result.failed[0].error.contains("no node named 'Nonexistent'"));

    let updated = result.workflow.unwrap();
    assert_eq!(updated.name, "renamed");
    assert!(updated.tags.iter().any(|t| t == "touched"));
}

#[test]
fn validate_only_reports_without_committing() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();

    let result = engine.apply(
        &wf,
        &ops(json!([
            {"type": "addNode", "node": {"name": "Transform", "type": "set"}},
            {"type": "addConnection", "source": "HTTP Request", "target": "Transform"}
        ])),
        &DiffOptions {
            validate_only: true,
            ..Default::default()
        },
    );

    assert!(result.success);
    assert_eq!(result.applied_count, 2);
    assert!(result.workflow.is_none());
}

#[test]
fn validate_only_surfaces_would_be_failures() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();

    let result = engine.apply(
        &wf,
        &ops(json!([
            {"type": "addConnection", "source": "Webhook", "target": "Ghost"}
        ])),
        &DiffOptions {
            validate_only: true,
            ..Default::default()
        },
    );

    assert!(!result.success);
    assert_eq!(result.applied_count, 0);
    assert!(result.errors[0].contains("Ghost"));
}

#[test]
fn rewire_keeps_graph_consistent() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();

    let result = engine.apply(
        &wf,
        &ops(json!([
            {"type": "addNode", "node": {"name": "Backup", "type": "httpRequest"}},
            {"type": "rewireConnection", "source": "Webhook",
             "from": "HTTP Request", "to": "Backup"}
        ])),
        &DiffOptions::default(),
    );

    let updated = result.workflow.unwrap();
    assert_eq!(updated.connection_count(), 1);
    assert_eq!(updated.connections["Webhook"]["main"][0][0].node, "Backup");
}

#[test]
fn remove_node_then_reconnect_in_one_batch() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();

    let result = engine.apply(
        &wf,
        &ops(json!([
            {"type": "removeNode", "name": "HTTP Request"},
            {"type": "addNode", "node": {"name": "Transform", "type": "set"}},
            {"type": "addConnection", "source": "Webhook", "target": "Transform"}
        ])),
        &DiffOptions::default(),
    );

    assert!(result.success, "errors: {:?}", result.errors);
    let updated = result.workflow.unwrap();
    assert!(!updated.has_node("HTTP Request"));
    assert_eq!(updated.connections["Webhook"]["main"][0][0].node, "Transform");
    let validation = result.validation.unwrap();
    assert!(validation.valid);
}

#[test]
fn committed_mutation_carries_connections_report() {
    let provider = capabilities();
    let engine = DiffEngine::new(&provider);
    let wf = base_workflow();

    let result = engine.apply(
        &wf,
        &ops(json!([
            {"type": "removeConnection", "source": "Webhook", "target": "HTTP Request"}
        ])),
        &DiffOptions::default(),
    );

    let validation = result.validation.unwrap();
    assert!(validation.valid, "disconnect is advisory only");
    assert_eq!(validation.warnings().len(), 1);
}
