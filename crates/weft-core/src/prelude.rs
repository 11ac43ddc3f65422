//! Weft Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use weft_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{
    ConversationStats, Entity, EntityId, Relation, RelevanceSignal, ScoredNode, SelectedSubgraph,
    SelectionStrategy, Timestamp,
};

// Re-export configuration
pub use crate::config::{EngineConfig, ScoringWeights};

// Re-export the graph-algorithms seam
pub use crate::algo::GraphAlgorithms;

// Re-export error types
pub use crate::error::{Result, WeftError};
