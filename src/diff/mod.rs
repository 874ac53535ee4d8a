//! Incremental workflow editing.
//!
//! A batch of typed operations is applied to a snapshot in two passes
//! (node lifecycle first, then relational and metadata), each operation
//! checked against the state left by the ones before it. The whole batch
//! commits or nothing does, unless the caller opts into partial
//! application.

mod engine;
mod operations;

pub use engine::{AppliedOperation, DiffEngine, DiffOptions, DiffResult, FailedOperation};
pub use operations::DiffOperation;
