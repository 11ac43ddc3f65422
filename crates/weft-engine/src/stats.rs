//! Aggregate conversation statistics for display.
//!
//! Stateless aggregation over counters the tracker and snapshot already
//! maintain; nothing here feeds back into selection.

use crate::relevance::RelevanceTracker;
use crate::snapshot::GraphSnapshot;
use weft_core::types::ConversationStats;

/// Combine tracker counters with the current snapshot's shape.
///
/// Most-discussed entries are labeled from the snapshot when the entity
/// still exists there, and fall back to the raw id for entities that have
/// not survived the latest reload.
pub fn aggregate(
    tracker: &RelevanceTracker,
    snapshot: &GraphSnapshot,
    top_n: usize,
) -> ConversationStats {
    let most_discussed = tracker
        .most_discussed(top_n)
        .into_iter()
        .map(|(id, count)| {
            let label = snapshot
                .entity(&id)
                .map(|e| e.label.clone())
                .unwrap_or_else(|| id.into_string());
            (label, count)
        })
        .collect();

    ConversationStats {
        total_queries: tracker.total_queries(),
        unique_entities: tracker.unique_entities(),
        most_discussed,
        avg_response_time: tracker.avg_response_time(),
        graph_node_count: snapshot.node_count(),
        graph_edge_count: snapshot.edge_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::types::{Entity, EntityId, Relation};

    #[test]
    fn aggregates_counters_and_graph_shape() {
        let snapshot = GraphSnapshot::from_parts(
            vec![
                Entity::new("naoko", "Naoko", "PERSON"),
                Entity::new("tokyo", "Tokyo", "PLACE"),
            ],
            vec![Relation::new("naoko", "tokyo", "lives_in")],
        )
        .unwrap();

        let tracker = RelevanceTracker::new(0.1);
        tracker.record_mentions([EntityId::new("naoko")], 0.0);
        tracker.record_mentions([EntityId::new("naoko"), EntityId::new("vanished")], 1.0);
        tracker.record_turn(0.5);
        tracker.record_turn(1.5);

        let stats = aggregate(&tracker, &snapshot, 5);
        assert_eq!(stats.total_queries, 2);
        assert_eq!(stats.unique_entities, 2);
        assert_eq!(stats.graph_node_count, 2);
        assert_eq!(stats.graph_edge_count, 1);
        assert!((stats.avg_response_time - 1.0).abs() < 1e-12);

        // Label from the snapshot where possible, raw id otherwise.
        assert_eq!(stats.most_discussed[0], ("Naoko".to_string(), 2));
        assert_eq!(stats.most_discussed[1], ("vanished".to_string(), 1));
    }
}
