//! Immutable knowledge-graph snapshot backed by petgraph.
//!
//! A snapshot owns the full node/edge set plus the indices the selector
//! needs: `HashMap` lookup from entity id to petgraph index, a lowercase
//! label index for extraction, and centrality scores computed once at
//! load time (they are expensive relative to the query rate). Snapshots
//! are never mutated after construction; reloads build a fresh one and
//! swap the handle.

use crate::centrality;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::Path;
use weft_core::algo::GraphAlgorithms;
use weft_core::error::{Result, WeftError};
use weft_core::types::{Entity, EntityId, Relation};

/// On-disk graph document produced by the ingestion engine.
#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default, alias = "type")]
    entity_type: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    source: String,
    target: String,
    #[serde(default)]
    relationship: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default = "default_weight")]
    weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Petgraph-backed immutable snapshot of the full knowledge graph.
pub struct GraphSnapshot {
    graph: Graph<Entity, Relation, petgraph::Undirected>,
    /// Map from entity id to petgraph's internal index.
    node_index: HashMap<EntityId, NodeIndex>,
    /// Index from lowercase label to entity ids for extraction lookups.
    label_index: HashMap<String, Vec<EntityId>>,
    /// Centrality per node, computed once at construction.
    centrality: HashMap<EntityId, f64>,
}

impl GraphSnapshot {
    /// The pre-ingestion state: a valid graph with nothing in it.
    pub fn empty() -> Self {
        Self {
            graph: Graph::new_undirected(),
            node_index: HashMap::new(),
            label_index: HashMap::new(),
            centrality: HashMap::new(),
        }
    }

    /// Load a serialized graph from disk.
    ///
    /// A missing or unparseable file is `GraphUnavailable` (recoverable);
    /// a parseable file violating graph invariants is
    /// `InconsistentSnapshot` (fails this load, previous snapshot stands).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WeftError::GraphUnavailable(format!(
                "graph source {} does not exist yet",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            WeftError::GraphUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Parse a graph from its JSON serialization.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: GraphFile = serde_json::from_str(raw)
            .map_err(|e| WeftError::GraphUnavailable(format!("malformed graph source: {}", e)))?;

        let nodes = file
            .nodes
            .into_iter()
            .map(|rec| {
                let label = rec.label.unwrap_or_else(|| rec.id.clone());
                Entity {
                    id: EntityId::new(&rec.id),
                    label,
                    entity_type: rec.entity_type.unwrap_or_else(|| "ENTITY".to_string()),
                    metadata: rec.metadata,
                }
            })
            .collect();

        let edges = file
            .edges
            .into_iter()
            .map(|rec| Relation {
                source: EntityId::new(&rec.source),
                target: EntityId::new(&rec.target),
                relationship: rec.relationship.unwrap_or_else(|| "related".to_string()),
                keywords: rec.keywords,
                weight: rec.weight,
            })
            .collect();

        Self::from_parts(nodes, edges)
    }

    /// Build a snapshot from already-typed nodes and edges, validating
    /// graph invariants and computing centrality.
    pub fn from_parts(nodes: Vec<Entity>, edges: Vec<Relation>) -> Result<Self> {
        let mut graph = Graph::new_undirected();
        let mut node_index: HashMap<EntityId, NodeIndex> = HashMap::new();
        let mut label_index: HashMap<String, Vec<EntityId>> = HashMap::new();

        for entity in nodes {
            if node_index.contains_key(&entity.id) {
                return Err(WeftError::InconsistentSnapshot(format!(
                    "duplicate entity id '{}'",
                    entity.id
                )));
            }
            let id = entity.id.clone();
            let label_key = entity.label.to_lowercase();
            let idx = graph.add_node(entity);
            node_index.insert(id.clone(), idx);
            label_index.entry(label_key).or_default().push(id);
        }

        for relation in edges {
            let Some(&source_idx) = node_index.get(&relation.source) else {
                return Err(WeftError::InconsistentSnapshot(format!(
                    "edge references unknown node '{}'",
                    relation.source
                )));
            };
            let Some(&target_idx) = node_index.get(&relation.target) else {
                return Err(WeftError::InconsistentSnapshot(format!(
                    "edge references unknown node '{}'",
                    relation.target
                )));
            };
            if !relation.weight.is_finite() || relation.weight < 0.0 {
                return Err(WeftError::InconsistentSnapshot(format!(
                    "edge {} -> {} has invalid weight {}",
                    relation.source, relation.target, relation.weight
                )));
            }
            // Multi-edges are kept distinct: no find_edge/replace here.
            graph.add_edge(source_idx, target_idx, relation);
        }

        let centrality = centrality::compute(&graph);

        Ok(Self {
            graph,
            node_index,
            label_index,
            centrality,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.node_index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.graph.edge_indices().map(|idx| &self.graph[idx])
    }

    /// Distinct neighbor ids of a node (multi-edges collapse here).
    pub fn neighbors(&self, id: &EntityId) -> Vec<EntityId> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        for neighbor in self.graph.neighbors(idx) {
            seen.insert(self.graph[neighbor].id.clone());
        }
        seen.into_iter().collect()
    }

    /// Cached centrality for a node; unknown nodes score 0.
    pub fn centrality_of(&self, id: &EntityId) -> f64 {
        self.centrality.get(id).copied().unwrap_or(0.0)
    }

    /// Top `n` nodes by centrality, ties broken by id for determinism.
    pub fn top_by_centrality(&self, n: usize) -> Vec<EntityId> {
        let mut ranked: Vec<(&EntityId, f64)> = self
            .node_index
            .keys()
            .map(|id| (id, self.centrality_of(id)))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked.into_iter().take(n).map(|(id, _)| id.clone()).collect()
    }

    /// Lowercase label index: label -> entity ids carrying that label.
    pub fn label_index(&self) -> &HashMap<String, Vec<EntityId>> {
        &self.label_index
    }

    /// Exactly the snapshot's edges whose both endpoints are in `nodes`.
    pub fn induced_edges(&self, nodes: &BTreeSet<EntityId>) -> Vec<Relation> {
        self.graph
            .edge_indices()
            .filter_map(|idx| {
                let relation = &self.graph[idx];
                if nodes.contains(&relation.source) && nodes.contains(&relation.target) {
                    Some(relation.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Breadth-first ego expansion: every node within `max_hops` hops of
    /// any seed, seeds included. Cost is bounded by hops x degree x seeds
    /// rather than the whole graph.
    pub fn ego_expand(&self, seeds: &BTreeSet<EntityId>, max_hops: usize) -> BTreeSet<EntityId> {
        let mut visited: BTreeSet<EntityId> = BTreeSet::new();
        let mut frontier: VecDeque<(EntityId, usize)> = VecDeque::new();

        for seed in seeds {
            if self.contains(seed) && visited.insert(seed.clone()) {
                frontier.push_back((seed.clone(), 0));
            }
        }

        while let Some((id, depth)) = frontier.pop_front() {
            if depth >= max_hops {
                continue;
            }
            for neighbor in self.neighbors(&id) {
                if visited.insert(neighbor.clone()) {
                    frontier.push_back((neighbor, depth + 1));
                }
            }
        }

        visited
    }
}

impl GraphAlgorithms for GraphSnapshot {
    fn compute_centrality(&self) -> HashMap<EntityId, f64> {
        centrality::compute(&self.graph)
    }

    fn shortest_path(&self, from: &EntityId, to: &EntityId) -> Option<Vec<EntityId>> {
        let &from_idx = self.node_index.get(from)?;
        let &to_idx = self.node_index.get(to)?;

        if from_idx == to_idx {
            return Some(vec![from.clone()]);
        }

        // Unweighted BFS; the connectivity guard wants hop-shortest paths.
        let mut prev: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(from_idx);

        while let Some(current) = queue.pop_front() {
            for edge in self.graph.edges(current) {
                let next = if edge.source() == current {
                    edge.target()
                } else {
                    edge.source()
                };
                if next == from_idx || prev.contains_key(&next) {
                    continue;
                }
                prev.insert(next, current);
                if next == to_idx {
                    let mut path = vec![self.graph[to_idx].id.clone()];
                    let mut cursor = to_idx;
                    while cursor != from_idx {
                        cursor = prev[&cursor];
                        path.push(self.graph[cursor].id.clone());
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }
}
