//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::collections::HashMap;

use flowpatch::{outputs, CapabilityDescriptor, StaticCapabilityProvider, Workflow};
use serde_json::Value;

/// Capability catalog mirroring a small but representative node palette.
pub fn capabilities() -> StaticCapabilityProvider {
    StaticCapabilityProvider::new()
        .with("webhook", CapabilityDescriptor {
            trigger: true,
            ..Default::default()
        })
        .with("httpRequest", CapabilityDescriptor::default())
        .with("set", CapabilityDescriptor::default())
        .with("splitInBatches", CapabilityDescriptor {
            outputs: outputs(&["done", "loop"]),
            loop_support: true,
            ..Default::default()
        })
        .with("agent", CapabilityDescriptor::default())
        .with("calculator", CapabilityDescriptor {
            usable_as_tool: true,
            ..Default::default()
        })
        .with("slack", CapabilityDescriptor {
            known_resources: vec![
                "channel".to_string(),
                "message".to_string(),
                "user".to_string(),
            ],
            operations_by_resource: HashMap::from([
                (
                    "channel".to_string(),
                    vec!["create".to_string(), "get".to_string(), "archive".to_string()],
                ),
                (
                    "message".to_string(),
                    vec!["post".to_string(), "update".to_string(), "delete".to_string()],
                ),
            ]),
            ..Default::default()
        })
}

pub fn workflow(json: Value) -> Workflow {
    serde_json::from_value(json).expect("fixture workflow must deserialize")
}
