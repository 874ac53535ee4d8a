//! Workflow structural validation.
//!
//! Three layers run in order over one adjacency view: structure (identity,
//! type resolution, endpoints, branch ranges), topology (triggers,
//! connectivity, cycles, loop-backs), semantics (error outputs, tool wiring,
//! parameter vocabulary). Every defect becomes a report finding; validation
//! itself never fails.

mod heuristics;
mod semantics;
mod structure;
mod topology;
mod types;

pub use heuristics::{looks_like_error_handler, ErrorHandlerClassifier};
pub use types::{Finding, Severity, Statistics, ValidationReport};

use tracing::debug;

use crate::capability::CapabilityProvider;
use crate::graph::WorkflowGraph;
use crate::schema::Workflow;
use crate::suggest::SuggestionService;

/// Default bound for loop-back and handler path searches.
pub const DEFAULT_MAX_LOOP_DEPTH: usize = 50;
/// Default minimum confidence for attaching a suggestion to a finding.
pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 0.7;

/// Tunable validation knobs.
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    pub max_loop_depth: usize,
    pub suggestion_threshold: f64,
    pub error_handler_classifier: ErrorHandlerClassifier,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_loop_depth: DEFAULT_MAX_LOOP_DEPTH,
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
            error_handler_classifier: looks_like_error_handler,
        }
    }
}

/// Which checks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Full,
    /// Skips the parameter-adjacent vocabulary checks.
    ConnectionsOnly,
}

/// Structural validator over an injected capability provider.
pub struct Validator<'a> {
    provider: &'a dyn CapabilityProvider,
    suggestions: SuggestionService<'a>,
    options: ValidatorOptions,
}

impl<'a> Validator<'a> {
    pub fn new(provider: &'a dyn CapabilityProvider) -> Self {
        Self::with_options(provider, ValidatorOptions::default())
    }

    pub fn with_options(provider: &'a dyn CapabilityProvider, options: ValidatorOptions) -> Self {
        Self {
            provider,
            suggestions: SuggestionService::new(provider),
            options,
        }
    }

    /// Full validation: structure, topology, and semantics.
    pub fn validate(&self, workflow: &Workflow) -> ValidationReport {
        self.run(workflow, Scope::Full)
    }

    /// Cheaper subset that skips parameter-adjacent checks.
    pub fn validate_connections_only(&self, workflow: &Workflow) -> ValidationReport {
        self.run(workflow, Scope::ConnectionsOnly)
    }

    fn run(&self, workflow: &Workflow, scope: Scope) -> ValidationReport {
        let graph = WorkflowGraph::build(workflow);

        let (mut findings, valid_connections) =
            structure::validate(workflow, &graph, self.provider);
        findings.extend(topology::validate(
            workflow,
            &graph,
            self.provider,
            &self.options,
        ));
        findings.extend(semantics::validate(
            workflow,
            &graph,
            self.provider,
            &self.suggestions,
            &self.options,
            scope,
        ));

        let statistics = Statistics {
            node_count: workflow.nodes.len(),
            connection_count: workflow.connection_count(),
            valid_connections,
        };

        debug!(
            nodes = statistics.node_count,
            connections = statistics.connection_count,
            findings = findings.len(),
            "workflow validated"
        );

        ValidationReport::new(findings, statistics)
    }
}
