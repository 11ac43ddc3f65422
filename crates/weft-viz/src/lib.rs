//! # Weft Viz
//!
//! Maps a selected subgraph into the wire payload a force-directed
//! renderer consumes. Pure presentation policy: sizes are a monotonic
//! function of composite score, colors come from the entity type, and
//! edges pass relationship/keywords/weight through untouched. The mapping
//! is deterministic for the same input so rendering tests can assert on
//! exact payloads.

use serde::{Deserialize, Serialize};
use weft_core::types::SelectedSubgraph;
use weft_engine::{GraphSnapshot, RelevanceTracker};

/// Minimum rendered node size.
const BASE_SIZE: f64 = 8.0;
/// Size span above the base for the top-scored node.
const SIZE_SPAN: f64 = 20.0;

/// Fallback color for unknown entity types.
const DEFAULT_COLOR: &str = "#4a5568";

/// Canvas color per entity type tag.
pub fn entity_color(entity_type: &str) -> &'static str {
    match entity_type.to_uppercase().as_str() {
        "PERSON" => "#1f77b4",
        "ORG" => "#ff7f0e",
        "EVENT" => "#2ca02c",
        "PLACE" => "#9467bd",
        "WORK" => "#8c564b",
        "DATE" => "#17becf",
        _ => DEFAULT_COLOR,
    }
}

/// A renderable node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub description: String,
    pub size: f64,
    pub color: String,
    pub is_focal: bool,
    pub frequency: u64,
    pub centrality: f64,
}

/// A renderable edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisEdge {
    pub source: String,
    pub target: String,
    pub relationship: String,
    pub keywords: Vec<String>,
    pub weight: f64,
}

/// The full canvas payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisGraph {
    pub nodes: Vec<VisNode>,
    pub links: Vec<VisEdge>,
}

impl VisGraph {
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }
}

/// Project a selection onto the canvas payload.
///
/// Node size is `BASE_SIZE + (score / max_score) * SIZE_SPAN`; a
/// selection whose scores are all zero renders everything at base size.
/// Node order follows the selection's (descending score, then id), which
/// is already deterministic.
pub fn project(
    selection: &SelectedSubgraph,
    snapshot: &GraphSnapshot,
    tracker: &RelevanceTracker,
) -> VisGraph {
    let max_score = selection
        .nodes
        .iter()
        .map(|n| n.score)
        .fold(0.0f64, f64::max);
    let scale = if max_score > 0.0 { max_score } else { 1.0 };

    let nodes = selection
        .nodes
        .iter()
        .map(|scored| {
            let entity = snapshot.entity(&scored.id);
            let (label, entity_type, description) = match entity {
                Some(e) => (e.label.clone(), e.entity_type.clone(), e.description().to_string()),
                None => (scored.id.to_string(), "ENTITY".to_string(), String::new()),
            };
            VisNode {
                id: scored.id.to_string(),
                color: entity_color(&entity_type).to_string(),
                size: BASE_SIZE + (scored.score / scale) * SIZE_SPAN,
                is_focal: scored.is_focal,
                frequency: tracker.mention_count(&scored.id),
                centrality: snapshot.centrality_of(&scored.id),
                label,
                entity_type,
                description,
            }
        })
        .collect();

    let links = selection
        .edges
        .iter()
        .map(|relation| VisEdge {
            source: relation.source.to_string(),
            target: relation.target.to_string(),
            relationship: relation.relationship.clone(),
            keywords: relation.keywords.clone(),
            weight: relation.weight,
        })
        .collect();

    VisGraph { nodes, links }
}
