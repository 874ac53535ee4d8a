//! Node classification heuristics.

use crate::schema::Node;

/// Pluggable classifier: does this node look like an error handler?
pub type ErrorHandlerClassifier = fn(&Node) -> bool;

const ERROR_HANDLER_KEYWORDS: &[&str] = &["error", "catch", "handle", "respond"];

/// Default keyword heuristic over node name and type.
pub fn looks_like_error_handler(node: &Node) -> bool {
    let name = node.name.to_lowercase();
    let node_type = node.node_type.to_lowercase();
    ERROR_HANDLER_KEYWORDS
        .iter()
        .any(|kw| name.contains(kw) || node_type.contains(kw))
}
