//! Per-turn engine facade.
//!
//! One query turn binds to one snapshot handle, acquired at turn start:
//! extraction, recording, and selection all read the same graph even if
//! an ingestion reload lands mid-turn. The tracker and stats tally are
//! the only state a turn mutates.

use crate::extract::{EntityExtractor, LabelMatcher};
use crate::relevance::RelevanceTracker;
use crate::selector::SubgraphSelector;
use crate::snapshot::GraphSnapshot;
use crate::stats;
use crate::store::GraphStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use weft_core::config::EngineConfig;
use weft_core::error::Result;
use weft_core::types::{ConversationStats, EntityId, SelectedSubgraph, Timestamp};

/// Everything a transport layer needs to answer one turn.
pub struct TurnOutcome {
    /// The snapshot this turn was bound to.
    pub snapshot: Arc<GraphSnapshot>,
    /// All focal entities extracted from query + answer.
    pub focal: BTreeSet<EntityId>,
    pub selection: SelectedSubgraph,
}

/// The contextual subgraph selection engine, shared across request
/// handlers. All methods take `&self`; interior mutability lives in the
/// store and tracker.
pub struct Engine {
    store: GraphStore,
    tracker: RelevanceTracker,
    selector: SubgraphSelector,
    extractor: Box<dyn EntityExtractor>,
    config: EngineConfig,
}

impl Engine {
    /// Build an engine over a store. Config validation happens here, at
    /// startup, so selection never has to re-check it per query.
    pub fn new(store: GraphStore, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tracker: RelevanceTracker::new(config.decay_lambda),
            selector: SubgraphSelector::new(&config),
            extractor: Box::new(LabelMatcher),
            store,
            config,
        })
    }

    /// Swap in a different extraction strategy.
    pub fn with_extractor(mut self, extractor: Box<dyn EntityExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Run one full conversational turn: extract focal entities from the
    /// query and the answer text, update relevance signals, and select
    /// the explaining subgraph.
    pub fn handle_turn(
        &self,
        query: &str,
        answer: &str,
        latency_secs: f64,
        now: Timestamp,
    ) -> TurnOutcome {
        let snapshot = self.store.current();

        let mut focal = self.extractor.extract(query, &snapshot);
        focal.extend(self.extractor.extract(answer, &snapshot));

        self.tracker.record_mentions(focal.iter().cloned(), now);
        self.tracker.record_turn(latency_secs);

        let selection = self.selector.select(&snapshot, &self.tracker, &focal, now);
        debug!(
            focal = focal.len(),
            selected = selection.nodes.len(),
            strategy = ?selection.strategy,
            "turn selection complete"
        );

        TurnOutcome {
            snapshot,
            focal,
            selection,
        }
    }

    /// Selection for an explicit entity set, without touching the
    /// conversation signals (the subgraph-by-labels endpoint).
    pub fn select_for(
        &self,
        focal: &BTreeSet<EntityId>,
        now: Timestamp,
    ) -> (Arc<GraphSnapshot>, SelectedSubgraph) {
        let snapshot = self.store.current();
        let selection = self.selector.select(&snapshot, &self.tracker, focal, now);
        (snapshot, selection)
    }

    pub fn stats(&self) -> ConversationStats {
        stats::aggregate(
            &self.tracker,
            &self.store.current(),
            self.config.most_discussed_top_n,
        )
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn tracker(&self) -> &RelevanceTracker {
        &self.tracker
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
