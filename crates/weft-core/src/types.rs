//! Shared types used across all Weft crates.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Seconds since the Unix epoch (or any fixed origin the caller picks).
///
/// Timestamps are plain floats so tests can drive the clock
/// deterministically; nothing in the engine calls a system clock.
pub type Timestamp = f64;

/// Stable, case-normalized identifier for an entity in the knowledge graph.
///
/// Identifiers are trimmed and lowercased on construction so that the same
/// entity extracted from different casings always maps to one signal record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// A node in the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Human-readable label as extracted from the corpus.
    pub label: String,
    /// Type tag (PERSON, ORG, EVENT, ...). Free-form; drives coloring.
    pub entity_type: String,
    /// Free-form metadata carried through from the ingestion engine.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Entity {
    pub fn new(id: impl AsRef<str>, label: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(id),
            label: label.into(),
            entity_type: entity_type.into(),
            metadata: HashMap::new(),
        }
    }

    /// Optional description stashed by the ingestion engine.
    pub fn description(&self) -> &str {
        self.metadata
            .get("description")
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// An edge in the knowledge graph.
///
/// Multi-edges between the same pair are allowed and kept distinct; they
/// differ by relationship label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub source: EntityId,
    pub target: EntityId,
    pub relationship: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Non-negative strength assigned by the extraction engine.
    pub weight: f64,
}

impl Relation {
    pub fn new(source: impl AsRef<str>, target: impl AsRef<str>, relationship: impl Into<String>) -> Self {
        Self {
            source: EntityId::new(source),
            target: EntityId::new(target),
            relationship: relationship.into(),
            keywords: Vec::new(),
            weight: 1.0,
        }
    }
}

/// Per-entity conversational signal maintained by the relevance tracker.
///
/// Created lazily on first mention and never deleted; it outlives graph
/// reloads so entities that vanish and reappear keep their history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceSignal {
    pub mention_count: u64,
    pub last_seen: Timestamp,
}

/// Which branch of the selection algorithm produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Seeds intersected the snapshot; ego expansion from those seeds.
    SeededExpansion,
    /// No recognized focal entities; top nodes by centrality instead.
    CentralityFallback,
}

/// A node retained by the selector, with its composite score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredNode {
    pub id: EntityId,
    pub score: f64,
    pub is_focal: bool,
}

/// The output of a selection pass: a small, connected, renderable subgraph.
///
/// Nodes are ordered by descending score (ties broken by id) and
/// deduplicated. Edges are exactly the snapshot edges whose endpoints both
/// survived selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedSubgraph {
    pub nodes: Vec<ScoredNode>,
    pub edges: Vec<Relation>,
    pub strategy: SelectionStrategy,
}

impl SelectedSubgraph {
    /// The normal pre-ingestion result: nothing to show, not an error.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            strategy: SelectionStrategy::CentralityFallback,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> BTreeSet<EntityId> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }
}

/// Aggregate conversation statistics for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationStats {
    pub total_queries: u64,
    pub unique_entities: usize,
    /// (display label, mention count), most-discussed first.
    pub most_discussed: Vec<(String, u64)>,
    pub avg_response_time: f64,
    pub graph_node_count: usize,
    pub graph_edge_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_normalizes_case_and_whitespace() {
        assert_eq!(EntityId::new("  Naoko "), EntityId::new("naoko"));
        assert_eq!(EntityId::new("TOKYO").as_str(), "tokyo");
    }

    #[test]
    fn empty_subgraph_has_no_nodes_or_edges() {
        let sel = SelectedSubgraph::empty();
        assert!(sel.is_empty());
        assert!(sel.edges.is_empty());
    }

    #[test]
    fn entity_id_serializes_transparently() {
        let id = EntityId::new("Naoko");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"naoko\"");
    }
}
