//! Structural centrality over the full graph.
//!
//! PageRank when the graph is connected enough to converge, degree
//! centrality otherwise. The fallback triggers on graphs with fewer than
//! two edges and on non-convergence within the iteration cap. Computed
//! once per snapshot load, never per query.

use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::debug;
use weft_core::types::{Entity, EntityId, Relation};

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;

type KnowledgeGraph = Graph<Entity, Relation, petgraph::Undirected>;

/// Centrality score per node. Empty graph yields an empty map.
pub fn compute(graph: &KnowledgeGraph) -> HashMap<EntityId, f64> {
    if graph.node_count() == 0 {
        return HashMap::new();
    }
    if graph.edge_count() < 2 {
        return degree_centrality(graph);
    }
    match pagerank(graph) {
        Some(scores) => scores,
        None => {
            debug!("pagerank did not converge, falling back to degree centrality");
            degree_centrality(graph)
        }
    }
}

/// Power-iteration PageRank over the undirected graph. Each incident edge
/// contributes, so multi-edges count as parallel links. Returns `None` if
/// the iteration cap is reached before convergence.
fn pagerank(graph: &KnowledgeGraph) -> Option<HashMap<EntityId, f64>> {
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    let n = nodes.len() as f64;

    let degree: HashMap<NodeIndex, usize> = nodes
        .iter()
        .map(|&idx| (idx, graph.edges(idx).count()))
        .collect();

    let mut rank: HashMap<NodeIndex, f64> = nodes.iter().map(|&idx| (idx, 1.0 / n)).collect();

    for iteration in 0..MAX_ITERATIONS {
        // Isolated nodes spread their mass evenly.
        let dangling: f64 = nodes
            .iter()
            .filter(|idx| degree[idx] == 0)
            .map(|idx| rank[idx])
            .sum();

        let mut next: HashMap<NodeIndex, f64> = HashMap::with_capacity(nodes.len());
        let mut delta = 0.0;

        for &idx in &nodes {
            let mut incoming = 0.0;
            for edge in graph.edges(idx) {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                incoming += rank[&other] / degree[&other] as f64;
            }
            let value = (1.0 - DAMPING) / n + DAMPING * (incoming + dangling / n);
            delta += (value - rank[&idx]).abs();
            next.insert(idx, value);
        }

        rank = next;
        if delta < TOLERANCE {
            debug!(iterations = iteration + 1, "pagerank converged");
            return Some(
                rank.into_iter()
                    .map(|(idx, score)| (graph[idx].id.clone(), score))
                    .collect(),
            );
        }
    }
    None
}

/// Degree centrality: degree / (n - 1), the standard normalization.
fn degree_centrality(graph: &KnowledgeGraph) -> HashMap<EntityId, f64> {
    let n = graph.node_count();
    let norm = if n > 1 { (n - 1) as f64 } else { 1.0 };
    graph
        .node_indices()
        .map(|idx| {
            let degree = graph.edges(idx).count() as f64;
            (graph[idx].id.clone(), degree / norm)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(nodes: &[&str], edges: &[(&str, &str)]) -> KnowledgeGraph {
        let mut graph = Graph::new_undirected();
        let mut index = HashMap::new();
        for &id in nodes {
            let idx = graph.add_node(Entity::new(id, id.to_uppercase(), "ENTITY"));
            index.insert(id, idx);
        }
        for &(a, b) in edges {
            graph.add_edge(index[a], index[b], Relation::new(a, b, "related"));
        }
        graph
    }

    #[test]
    fn empty_graph_has_no_scores() {
        let graph = build(&[], &[]);
        assert!(compute(&graph).is_empty());
    }

    #[test]
    fn sparse_graph_uses_degree_centrality() {
        // One edge: below the PageRank threshold.
        let graph = build(&["a", "b", "c"], &[("a", "b")]);
        let scores = compute(&graph);
        assert!((scores[&EntityId::new("a")] - 0.5).abs() < 1e-12);
        assert!((scores[&EntityId::new("b")] - 0.5).abs() < 1e-12);
        assert!(scores[&EntityId::new("c")].abs() < 1e-12);
    }

    #[test]
    fn pagerank_favors_the_hub() {
        // Star: hub connected to four spokes.
        let graph = build(
            &["hub", "s1", "s2", "s3", "s4"],
            &[("hub", "s1"), ("hub", "s2"), ("hub", "s3"), ("hub", "s4")],
        );
        let scores = compute(&graph);
        let hub = scores[&EntityId::new("hub")];
        for spoke in ["s1", "s2", "s3", "s4"] {
            assert!(hub > scores[&EntityId::new(spoke)]);
        }
    }

    #[test]
    fn pagerank_scores_sum_to_one() {
        let graph = build(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")],
        );
        let scores = compute(&graph);
        let total: f64 = scores.values().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    fn symmetric_nodes_score_equally() {
        let graph = build(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let scores = compute(&graph);
        assert!(
            (scores[&EntityId::new("a")] - scores[&EntityId::new("c")]).abs() < 1e-9,
            "endpoints of a symmetric chain must score the same"
        );
    }
}
