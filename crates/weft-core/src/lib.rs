//! # Weft Core
//!
//! Shared types and contracts for the Weft contextual subgraph selection
//! engine. This crate defines the vocabulary the rest of the workspace
//! speaks:
//!
//! - **Entity / Relation** — nodes and edges of the ingested knowledge graph
//! - **SelectedSubgraph** — the output of a per-turn selection, with scores,
//!   focal flags, and the strategy that produced it
//! - **GraphAlgorithms** — the narrow seam behind which centrality and
//!   shortest-path computation live
//! - **EngineConfig** — operator-tunable scoring weights and traversal bounds
//! - **WeftError** — the error taxonomy shared across crates
//!
//! ## Quick Start
//!
//! ```rust
//! use weft_core::prelude::*;
//!
//! let id = EntityId::new("Naoko");
//! assert_eq!(id.as_str(), "naoko");
//!
//! let config = EngineConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod algo;
pub mod config;
pub mod error;
pub mod prelude;
pub mod types;
