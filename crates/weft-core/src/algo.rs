//! The narrow seam for graph algorithms.
//!
//! This is the one place the engine leans on heavier graph machinery.
//! Keeping it a trait means the petgraph-backed snapshot, or any other
//! backend, satisfies it with a hand-rolled PageRank and BFS.

use crate::types::EntityId;
use std::collections::HashMap;

/// Structural computations over a full graph snapshot.
pub trait GraphAlgorithms {
    /// Structural importance per node. Implementations should attempt
    /// PageRank and fall back to degree centrality when the graph is too
    /// sparse to converge.
    fn compute_centrality(&self) -> HashMap<EntityId, f64>;

    /// Hop-shortest path between two nodes, endpoints included.
    /// `None` when either node is missing or no path exists.
    fn shortest_path(&self, from: &EntityId, to: &EntityId) -> Option<Vec<EntityId>>;
}
