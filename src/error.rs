//! Error types for the validation and diff engine.
//!
//! Malformed *workflows* are never errors here — the validator turns every
//! structural defect into a report finding, and the diff engine turns every
//! per-operation problem into a structured `failed` entry. [`EngineError`]
//! covers only input that is not workflow-shaped at all.

use thiserror::Error;

/// Hard failures at the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid workflow snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Invalid operation list: {0}")]
    InvalidOperations(String),
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

/// Convenience alias for engine-level results.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        assert_eq!(
            EngineError::InvalidSnapshot("not an object".into()).to_string(),
            "Invalid workflow snapshot: not an object"
        );
        assert_eq!(
            EngineError::InvalidOperations("expected an array".into()).to_string(),
            "Invalid operation list: expected an array"
        );
        assert_eq!(
            EngineError::InvalidOptions("bad flag".into()).to_string(),
            "Invalid options: bad flag"
        );
    }
}
