//! Per-entity conversational relevance signals.
//!
//! The tracker is the one piece of state that outlives graph reloads:
//! entities surviving a reload keep their mention history, new entities
//! start cold, and identifiers the current snapshot does not know are
//! recorded anyway because they may reappear after a future reload.
//!
//! Mutation batches once per user turn and reads fan out across the
//! selector, so a single coarse RwLock around the table is enough;
//! contention is one writer per turn against short read sections.

use parking_lot::RwLock;
use std::collections::HashMap;
use weft_core::types::{EntityId, RelevanceSignal, Timestamp};

#[derive(Default)]
struct SignalTable {
    signals: HashMap<EntityId, RelevanceSignal>,
    /// Highest mention count ever observed, for normalization.
    max_mentions: u64,
    total_queries: u64,
    latency_sum: f64,
}

/// Mention frequency and recency tracker, spanning the process lifetime.
pub struct RelevanceTracker {
    table: RwLock<SignalTable>,
    /// Exponential decay rate per second; larger means faster forgetting.
    decay_lambda: f64,
}

impl RelevanceTracker {
    pub fn new(decay_lambda: f64) -> Self {
        Self {
            table: RwLock::new(SignalTable::default()),
            decay_lambda,
        }
    }

    /// Record one mention of each id at time `when`. Counts are monotonic;
    /// signals are created lazily and never deleted.
    pub fn record_mentions<I>(&self, ids: I, when: Timestamp)
    where
        I: IntoIterator<Item = EntityId>,
    {
        let mut table = self.table.write();
        for id in ids {
            let signal = table
                .signals
                .entry(id)
                .or_insert(RelevanceSignal {
                    mention_count: 0,
                    last_seen: when,
                });
            signal.mention_count += 1;
            signal.last_seen = when;
            let count = signal.mention_count;
            table.max_mentions = table.max_mentions.max(count);
        }
    }

    /// Tally one answered query turn and its response latency.
    pub fn record_turn(&self, latency_secs: f64) {
        let mut table = self.table.write();
        table.total_queries += 1;
        table.latency_sum += latency_secs;
    }

    /// `(mention_count / max_mention_count) * exp(-lambda * elapsed)`.
    ///
    /// A pure read: the decayed value is recomputed from the stored
    /// signal, never cached stale. Never-seen entities score 0.
    pub fn decayed_score(&self, id: &EntityId, now: Timestamp) -> f64 {
        let table = self.table.read();
        let Some(signal) = table.signals.get(id) else {
            return 0.0;
        };
        let norm = signal.mention_count as f64 / table.max_mentions.max(1) as f64;
        let elapsed = (now - signal.last_seen).max(0.0);
        norm * (-self.decay_lambda * elapsed).exp()
    }

    /// Recency factor alone: `exp(-lambda * elapsed)`, 0 if never seen.
    pub fn recency(&self, id: &EntityId, now: Timestamp) -> f64 {
        let table = self.table.read();
        match table.signals.get(id) {
            Some(signal) => {
                let elapsed = (now - signal.last_seen).max(0.0);
                (-self.decay_lambda * elapsed).exp()
            }
            None => 0.0,
        }
    }

    /// Normalized mention frequency in [0, 1].
    pub fn frequency(&self, id: &EntityId) -> f64 {
        let table = self.table.read();
        let count = table.signals.get(id).map(|s| s.mention_count).unwrap_or(0);
        count as f64 / table.max_mentions.max(1) as f64
    }

    pub fn mention_count(&self, id: &EntityId) -> u64 {
        self.table
            .read()
            .signals
            .get(id)
            .map(|s| s.mention_count)
            .unwrap_or(0)
    }

    /// How many distinct entities have ever been mentioned.
    pub fn unique_entities(&self) -> usize {
        self.table.read().signals.len()
    }

    pub fn total_queries(&self) -> u64 {
        self.table.read().total_queries
    }

    pub fn avg_response_time(&self) -> f64 {
        let table = self.table.read();
        if table.total_queries == 0 {
            0.0
        } else {
            table.latency_sum / table.total_queries as f64
        }
    }

    /// Top `n` entities by mention count, ties broken by id.
    pub fn most_discussed(&self, n: usize) -> Vec<(EntityId, u64)> {
        let table = self.table.read();
        let mut ranked: Vec<(EntityId, u64)> = table
            .signals
            .iter()
            .map(|(id, signal)| (id.clone(), signal.mention_count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}
