//! # flowpatch — workflow validation and incremental editing
//!
//! `flowpatch` checks automation workflow graphs against structural and
//! semantic invariants and applies batches of patch operations with
//! transactional semantics. It operates on in-memory snapshots supplied by
//! the caller and returns mutated snapshots; it never executes workflows,
//! interprets parameter expressions, or persists anything.
//!
//! - **Structural validation**: endpoint resolution, name uniqueness,
//!   branch classification, trigger/orphan analysis, cycle and loop-back
//!   detection, error-output consistency, tool wiring, parameter
//!   vocabulary — every defect reported as a finding, never an `Err`.
//! - **Diff engine**: two-pass batch application (node lifecycle first,
//!   then relational/metadata), copy-on-write with all-or-nothing commit,
//!   optional partial application and validate-only dry runs.
//! - **Similarity suggestions**: ranked, confidence-scored corrections for
//!   invalid resource/operation values, attached to findings when
//!   confident enough.
//!
//! Everything the engine knows about node types comes from an injected
//! read-only [`CapabilityProvider`]; there is no registry of concrete node
//! implementations in this crate.
//!
//! # Quick start
//!
//! ```rust
//! use flowpatch::{
//!     CapabilityDescriptor, DiffEngine, DiffOperation, DiffOptions,
//!     StaticCapabilityProvider, Validator, Workflow,
//! };
//!
//! let provider = StaticCapabilityProvider::new()
//!     .with("webhook", CapabilityDescriptor { trigger: true, ..Default::default() })
//!     .with("httpRequest", CapabilityDescriptor::default());
//!
//! let workflow: Workflow = serde_json::from_value(serde_json::json!({
//!     "name": "demo",
//!     "nodes": [
//!         {"name": "Webhook", "type": "webhook"},
//!         {"name": "HTTP Request", "type": "httpRequest"}
//!     ]
//! })).unwrap();
//!
//! let validator = Validator::new(&provider);
//! let report = validator.validate(&workflow);
//! assert!(report.valid);
//!
//! let engine = DiffEngine::new(&provider);
//! let ops: Vec<DiffOperation> = serde_json::from_value(serde_json::json!([
//!     {"type": "addConnection", "source": "Webhook", "target": "HTTP Request"}
//! ])).unwrap();
//! let result = engine.apply(&workflow, &ops, &DiffOptions::default());
//! assert!(result.success);
//! ```

pub mod capability;
pub mod diff;
pub mod error;
pub mod graph;
pub mod schema;
pub mod suggest;
pub mod validation;

pub use capability::{
    outputs, CapabilityDescriptor, CapabilityProvider, OutputBranch, StaticCapabilityProvider,
};
pub use diff::{
    AppliedOperation, DiffEngine, DiffOperation, DiffOptions, DiffResult, FailedOperation,
};
pub use error::{EngineError, EngineResult};
pub use schema::{ConnectionMap, ConnectionTarget, Node, OnError, RetryPolicy, Workflow};
pub use suggest::{Suggestion, SuggestionService};
pub use validation::{
    Finding, Severity, Statistics, ValidationReport, Validator, ValidatorOptions,
};
