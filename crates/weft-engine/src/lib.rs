//! # Weft Engine
//!
//! The contextual subgraph selection engine. Given a full knowledge graph
//! and a stream of query/answer turns, it maintains per-entity relevance
//! signals and, on each turn, selects a small, connected, renderable
//! subgraph that best explains the current conversational focus.
//!
//! Components, leaf-first:
//!
//! - [`snapshot::GraphSnapshot`] — immutable petgraph-backed graph with
//!   precomputed centrality and label indices
//! - [`store::GraphStore`] — hot-swappable handle to the current snapshot
//! - [`relevance::RelevanceTracker`] — mention frequency and recency decay
//! - [`selector::SubgraphSelector`] — seeding, ego expansion, composite
//!   scoring, budget trimming, and the connectivity guard
//! - [`stats`] — aggregate conversation counters for display
//! - [`extract`] — pluggable entity extraction over the label index
//! - [`engine::Engine`] — the per-turn facade binding one query turn to
//!   one snapshot reference

pub mod centrality;
pub mod engine;
pub mod extract;
pub mod relevance;
pub mod selector;
pub mod snapshot;
pub mod stats;
pub mod store;

pub use engine::{Engine, TurnOutcome};
pub use extract::{EntityExtractor, LabelMatcher};
pub use relevance::RelevanceTracker;
pub use selector::SubgraphSelector;
pub use snapshot::GraphSnapshot;
pub use store::GraphStore;
