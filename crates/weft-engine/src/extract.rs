//! Entity extraction from free text.
//!
//! The engine only needs "which known entities does this text mention";
//! the matching algorithm is pluggable. The default is case-insensitive
//! label-substring matching over the snapshot's label index, which is
//! what the answer text coming back from the retrieval engine needs.

use crate::snapshot::GraphSnapshot;
use std::collections::BTreeSet;
use weft_core::types::EntityId;

/// Pluggable extraction: text plus the known label set, entities out.
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str, snapshot: &GraphSnapshot) -> BTreeSet<EntityId>;
}

/// Case-insensitive substring matcher over the snapshot's labels.
#[derive(Debug, Default, Clone, Copy)]
pub struct LabelMatcher;

impl EntityExtractor for LabelMatcher {
    fn extract(&self, text: &str, snapshot: &GraphSnapshot) -> BTreeSet<EntityId> {
        let lowered = text.to_lowercase();
        let mut matches = BTreeSet::new();
        for (label, ids) in snapshot.label_index() {
            if !label.is_empty() && lowered.contains(label) {
                matches.extend(ids.iter().cloned());
            }
        }
        matches
    }
}

/// Resolve exact (case-insensitive) labels to entity ids, for callers that
/// already hold label strings rather than free text.
pub fn resolve_labels<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    snapshot: &GraphSnapshot,
) -> BTreeSet<EntityId> {
    let mut resolved = BTreeSet::new();
    for label in labels {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(ids) = snapshot.label_index().get(&trimmed.to_lowercase()) {
            resolved.extend(ids.iter().cloned());
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::types::{Entity, Relation};

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot::from_parts(
            vec![
                Entity::new("naoko", "Naoko", "PERSON"),
                Entity::new("tokyo", "Tokyo", "PLACE"),
                Entity::new("kobe", "Kobe", "PLACE"),
            ],
            vec![Relation::new("naoko", "tokyo", "lives_in")],
        )
        .unwrap()
    }

    #[test]
    fn matches_labels_case_insensitively() {
        let snapshot = snapshot();
        let found = LabelMatcher.extract("Did NAOKO ever visit tokyo?", &snapshot);
        assert_eq!(
            found,
            [EntityId::new("naoko"), EntityId::new("tokyo")]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn no_match_yields_empty_set() {
        let snapshot = snapshot();
        assert!(LabelMatcher.extract("nothing relevant here", &snapshot).is_empty());
    }

    #[test]
    fn resolves_exact_labels_only() {
        let snapshot = snapshot();
        let resolved = resolve_labels(["Tokyo", " kobe ", "", "Osaka"], &snapshot);
        assert_eq!(
            resolved,
            [EntityId::new("tokyo"), EntityId::new("kobe")]
                .into_iter()
                .collect()
        );
    }
}
