//! Error types for Weft operations.
//!
//! Two graph-load failures are deliberately distinct: a missing or
//! unparseable source is `GraphUnavailable` and recoverable (callers fall
//! back to an empty snapshot), while a parseable file whose edges reference
//! unknown nodes is `InconsistentSnapshot` and fails that load cleanly,
//! leaving any previously active snapshot untouched.

use thiserror::Error;

/// Result type for Weft operations.
pub type Result<T> = std::result::Result<T, WeftError>;

/// Errors that can occur across the Weft engine.
#[derive(Debug, Error)]
pub enum WeftError {
    /// Input graph missing or malformed at load time. Recoverable:
    /// operate on an empty graph and surface "graph not yet built".
    #[error("graph unavailable: {0}")]
    GraphUnavailable(String),

    /// Internal invariant violation in a parsed graph (dangling edge,
    /// duplicate id, negative weight). Fatal to that load call only.
    #[error("inconsistent snapshot: {0}")]
    InconsistentSnapshot(String),

    /// Malformed configuration, raised at startup validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WeftError {
    /// Whether callers may continue on an empty graph after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, WeftError::GraphUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_graph_unavailable_is_recoverable() {
        assert!(WeftError::GraphUnavailable("missing".into()).is_recoverable());
        assert!(!WeftError::InconsistentSnapshot("dangling edge".into()).is_recoverable());
        assert!(!WeftError::Config("budget must be >= 1".into()).is_recoverable());
    }
}
