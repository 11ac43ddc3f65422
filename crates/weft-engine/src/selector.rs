//! Contextual subgraph selection.
//!
//! Strategy per turn:
//! 1. Seed from the focal entities present in the snapshot; with no
//!    recognized seeds, fall back to the most central nodes so the canvas
//!    is never empty.
//! 2. Ego expansion from the seeds up to the hop limit.
//! 3. Composite scoring: frequency + recency + cached centrality + a
//!    focal bonus that keeps seeds ahead of cheap neighbors.
//! 4. Trim to the node budget; seeds bypass the cutoff.
//! 5. Connectivity guard: seeds left disconnected inside the trimmed set
//!    get the nodes of a full-graph shortest path spliced back in, even
//!    when that exceeds the budget.
//! 6. Materialize the induced edge set.
//!
//! Selection is a pure read over a borrowed snapshot and tracker; it may
//! run fully in parallel across simultaneous queries.

use crate::relevance::RelevanceTracker;
use crate::snapshot::GraphSnapshot;
use std::collections::BTreeSet;
use tracing::trace;
use weft_core::algo::GraphAlgorithms;
use weft_core::config::{EngineConfig, ScoringWeights};
use weft_core::types::{EntityId, ScoredNode, SelectedSubgraph, SelectionStrategy, Timestamp};

/// Pure selection function over (snapshot, tracker, focal set, clock).
#[derive(Debug, Clone)]
pub struct SubgraphSelector {
    max_nodes: usize,
    max_hops: usize,
    weights: ScoringWeights,
}

impl SubgraphSelector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_nodes: config.max_nodes,
            max_hops: config.max_hops,
            weights: config.weights,
        }
    }

    /// Select the subgraph explaining the current focus. Never fails for a
    /// valid snapshot; an empty snapshot yields an empty result.
    pub fn select(
        &self,
        snapshot: &GraphSnapshot,
        tracker: &RelevanceTracker,
        focal: &BTreeSet<EntityId>,
        now: Timestamp,
    ) -> SelectedSubgraph {
        if snapshot.is_empty() {
            return SelectedSubgraph::empty();
        }

        // Seeding: focal entities the snapshot actually knows.
        let seeds: BTreeSet<EntityId> = focal
            .iter()
            .filter(|id| snapshot.contains(id))
            .cloned()
            .collect();

        let (strategy, candidates) = if seeds.is_empty() {
            (
                SelectionStrategy::CentralityFallback,
                snapshot
                    .top_by_centrality(self.max_nodes)
                    .into_iter()
                    .collect::<BTreeSet<_>>(),
            )
        } else {
            (
                SelectionStrategy::SeededExpansion,
                snapshot.ego_expand(&seeds, self.max_hops),
            )
        };

        // Scoring, then trim: seeds are always retained, remaining budget
        // goes to the best-scored neighbors.
        let mut ranked: Vec<ScoredNode> = candidates
            .iter()
            .map(|id| ScoredNode {
                id: id.clone(),
                score: self.composite_score(snapshot, tracker, id, &seeds, now),
                is_focal: seeds.contains(id),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut retained: Vec<ScoredNode> = Vec::with_capacity(self.max_nodes);
        let mut slots = self.max_nodes.saturating_sub(seeds.len());
        for node in ranked {
            if node.is_focal {
                retained.push(node);
            } else if slots > 0 {
                retained.push(node);
                slots -= 1;
            }
        }

        let mut selected: BTreeSet<EntityId> = retained.iter().map(|n| n.id.clone()).collect();

        // Connectivity guard: an explanation graph showing two relevant
        // entities with no path between them is worse than a slightly
        // larger one.
        let retained_seeds: Vec<EntityId> = seeds
            .iter()
            .filter(|id| selected.contains(*id))
            .cloned()
            .collect();
        for i in 0..retained_seeds.len() {
            for j in (i + 1)..retained_seeds.len() {
                let (a, b) = (&retained_seeds[i], &retained_seeds[j]);
                if connected_within(snapshot, &selected, a, b) {
                    continue;
                }
                if let Some(path) = snapshot.shortest_path(a, b) {
                    trace!(
                        from = a.as_str(),
                        to = b.as_str(),
                        spliced = path.len().saturating_sub(2),
                        "connectivity guard spliced a path"
                    );
                    for id in path {
                        if selected.insert(id.clone()) {
                            retained.push(ScoredNode {
                                score: self.composite_score(snapshot, tracker, &id, &seeds, now),
                                is_focal: seeds.contains(&id),
                                id,
                            });
                        }
                    }
                }
            }
        }

        retained.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        let edges = snapshot.induced_edges(&selected);

        SelectedSubgraph {
            nodes: retained,
            edges,
            strategy,
        }
    }

    /// `w1*frequency + w2*recency + w3*centrality + w4*focal`.
    ///
    /// Frequency and recency are independent terms: normalized mention
    /// count on one side, pure `exp(-lambda * elapsed)` on the other.
    fn composite_score(
        &self,
        snapshot: &GraphSnapshot,
        tracker: &RelevanceTracker,
        id: &EntityId,
        seeds: &BTreeSet<EntityId>,
        now: Timestamp,
    ) -> f64 {
        let focal = if seeds.contains(id) { 1.0 } else { 0.0 };
        self.weights.frequency * tracker.frequency(id)
            + self.weights.recency * tracker.recency(id, now)
            + self.weights.centrality * snapshot.centrality_of(id)
            + self.weights.focal * focal
    }
}

/// BFS restricted to `within`: are `a` and `b` connected using only
/// selected nodes?
fn connected_within(
    snapshot: &GraphSnapshot,
    within: &BTreeSet<EntityId>,
    a: &EntityId,
    b: &EntityId,
) -> bool {
    if a == b {
        return true;
    }
    let mut visited: BTreeSet<&EntityId> = BTreeSet::new();
    let mut frontier = vec![a];
    visited.insert(a);

    while let Some(current) = frontier.pop() {
        for neighbor in snapshot.neighbors(current) {
            if !within.contains(&neighbor) {
                continue;
            }
            if neighbor == *b {
                return true;
            }
            if let Some(stored) = within.get(&neighbor) {
                if visited.insert(stored) {
                    frontier.push(stored);
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::types::{Entity, Relation};

    fn chain_snapshot() -> GraphSnapshot {
        // a - b - c - d, weight 1 each.
        GraphSnapshot::from_parts(
            vec![
                Entity::new("a", "A", "PERSON"),
                Entity::new("b", "B", "PERSON"),
                Entity::new("c", "C", "PLACE"),
                Entity::new("d", "D", "PLACE"),
            ],
            vec![
                Relation::new("a", "b", "knows"),
                Relation::new("b", "c", "visited"),
                Relation::new("c", "d", "near"),
            ],
        )
        .unwrap()
    }

    fn selector(max_nodes: usize, max_hops: usize) -> SubgraphSelector {
        let config = EngineConfig {
            max_nodes,
            max_hops,
            ..EngineConfig::default()
        };
        SubgraphSelector::new(&config)
    }

    fn focal(names: &[&str]) -> BTreeSet<EntityId> {
        names.iter().map(EntityId::new).collect()
    }

    #[test]
    fn empty_snapshot_selects_nothing() {
        let snapshot = GraphSnapshot::empty();
        let tracker = RelevanceTracker::new(0.1);
        let result = selector(10, 2).select(&snapshot, &tracker, &focal(&["a"]), 0.0);
        assert!(result.is_empty());
        assert!(result.edges.is_empty());
    }

    #[test]
    fn no_focal_falls_back_to_top_centrality() {
        let snapshot = chain_snapshot();
        let tracker = RelevanceTracker::new(0.1);
        let result = selector(2, 2).select(&snapshot, &tracker, &BTreeSet::new(), 0.0);

        assert_eq!(result.strategy, SelectionStrategy::CentralityFallback);
        let expected: BTreeSet<EntityId> = snapshot.top_by_centrality(2).into_iter().collect();
        assert_eq!(result.node_ids(), expected);
        assert!(result.nodes.iter().all(|n| !n.is_focal));
    }

    #[test]
    fn unrecognized_focal_uses_fallback_too() {
        let snapshot = chain_snapshot();
        let tracker = RelevanceTracker::new(0.1);
        let result = selector(3, 2).select(&snapshot, &tracker, &focal(&["ghost"]), 0.0);
        assert_eq!(result.strategy, SelectionStrategy::CentralityFallback);
        assert_eq!(result.nodes.len(), 3);
    }

    #[test]
    fn seeds_are_never_trimmed() {
        let snapshot = chain_snapshot();
        let tracker = RelevanceTracker::new(0.1);
        // Heavy history on b so it outranks raw seeds; budget 1.
        for _ in 0..10 {
            tracker.record_mentions([EntityId::new("b")], 0.0);
        }
        let result = selector(1, 2).select(&snapshot, &tracker, &focal(&["a"]), 0.0);
        assert!(result.contains(&EntityId::new("a")));
    }

    #[test]
    fn budget_is_respected_without_guard_splices() {
        let snapshot = chain_snapshot();
        let tracker = RelevanceTracker::new(0.1);
        let result = selector(2, 3).select(&snapshot, &tracker, &focal(&["a"]), 0.0);
        assert!(result.nodes.len() <= 2);
        assert_eq!(result.strategy, SelectionStrategy::SeededExpansion);
    }

    #[test]
    fn connectivity_guard_splices_the_chain() {
        // Focal {a, d}, hops 1, budget 2. Trimming keeps
        // only the seeds; the guard must splice b and c back in.
        let snapshot = chain_snapshot();
        let tracker = RelevanceTracker::new(0.1);
        let result = selector(2, 1).select(&snapshot, &tracker, &focal(&["a", "d"]), 0.0);

        assert_eq!(
            result.node_ids(),
            focal(&["a", "b", "c", "d"]),
            "guard must splice exactly the shortest-path nodes"
        );
        assert_eq!(result.edges.len(), 3);

        let spliced: Vec<&ScoredNode> = result
            .nodes
            .iter()
            .filter(|n| n.id == EntityId::new("b") || n.id == EntityId::new("c"))
            .collect();
        assert!(spliced.iter().all(|n| !n.is_focal));
    }

    #[test]
    fn connected_seeds_trigger_no_splice() {
        let snapshot = chain_snapshot();
        let tracker = RelevanceTracker::new(0.1);
        let result = selector(10, 1).select(&snapshot, &tracker, &focal(&["a", "b"]), 0.0);
        // a and b are adjacent; everything stays within budget.
        assert!(result.nodes.len() <= 3); // a, b, and b's other neighbor c
        assert!(result.contains(&EntityId::new("a")));
        assert!(result.contains(&EntityId::new("b")));
    }

    #[test]
    fn disconnected_components_stay_apart_when_no_path_exists() {
        let snapshot = GraphSnapshot::from_parts(
            vec![
                Entity::new("a", "A", "PERSON"),
                Entity::new("b", "B", "PERSON"),
                Entity::new("x", "X", "ORG"),
                Entity::new("y", "Y", "ORG"),
            ],
            vec![Relation::new("a", "b", "knows"), Relation::new("x", "y", "owns")],
        )
        .unwrap();
        let tracker = RelevanceTracker::new(0.1);
        let result = selector(4, 1).select(&snapshot, &tracker, &focal(&["a", "x"]), 0.0);

        // No path exists in the full graph, so the guard adds nothing.
        assert!(result.contains(&EntityId::new("a")));
        assert!(result.contains(&EntityId::new("x")));
        assert!(result.nodes.len() <= 4);
    }

    #[test]
    fn focal_bonus_ranks_seed_first() {
        let snapshot = chain_snapshot();
        let tracker = RelevanceTracker::new(0.1);
        let result = selector(4, 2).select(&snapshot, &tracker, &focal(&["a"]), 0.0);
        assert_eq!(result.nodes[0].id, EntityId::new("a"));
        assert!(result.nodes[0].is_focal);
    }

    #[test]
    fn recency_term_is_independent_of_mention_count() {
        let snapshot = chain_snapshot();
        // b: mentioned often but long ago; c: once, just now.
        let tracker = RelevanceTracker::new(0.05);
        for _ in 0..10 {
            tracker.record_mentions([EntityId::new("b")], 0.0);
        }
        tracker.record_mentions([EntityId::new("c")], 100.0);

        let config = EngineConfig {
            max_nodes: 4,
            max_hops: 2,
            weights: ScoringWeights {
                frequency: 0.0,
                recency: 1.0,
                centrality: 0.0,
                focal: 0.0,
            },
            ..EngineConfig::default()
        };
        let result =
            SubgraphSelector::new(&config).select(&snapshot, &tracker, &focal(&["a"]), 100.0);

        let score_of = |name: &str| {
            result
                .nodes
                .iter()
                .find(|n| n.id == EntityId::new(name))
                .unwrap()
                .score
        };
        // A just-mentioned node scores the full recency weight no matter
        // how small its mention count is next to the table maximum.
        assert!((score_of("c") - 1.0).abs() < 1e-9);
        assert!(score_of("b") < score_of("c"));
    }

    #[test]
    fn result_is_deterministic() {
        let snapshot = chain_snapshot();
        let tracker = RelevanceTracker::new(0.1);
        tracker.record_mentions([EntityId::new("b"), EntityId::new("c")], 1.0);

        let sel = selector(3, 2);
        let first = sel.select(&snapshot, &tracker, &focal(&["a"]), 5.0);
        let second = sel.select(&snapshot, &tracker, &focal(&["a"]), 5.0);
        assert_eq!(first.node_ids(), second.node_ids());
        let order_a: Vec<&EntityId> = first.nodes.iter().map(|n| &n.id).collect();
        let order_b: Vec<&EntityId> = second.nodes.iter().map(|n| &n.id).collect();
        assert_eq!(order_a, order_b);
    }
}
