//! Application state shared across request handlers.
//!
//! The engine is `&self`-threaded throughout, so handlers share one
//! `Arc<Engine>` and run selections fully in parallel; only the tracker's
//! internal lock serializes the per-turn mutation batch.

use crate::retriever::{ChatMessage, Retriever};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use weft_core::types::Timestamp;
use weft_engine::Engine;
use weft_viz::VisGraph;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub retriever: Arc<dyn Retriever>,
}

/// Everything one answered turn produces for the client.
pub struct QueryOutcome {
    pub response: String,
    pub graph: VisGraph,
    /// Display labels of the focal entities, sorted.
    pub entities: Vec<String>,
    pub processing_time: f64,
}

impl AppState {
    pub fn new(engine: Arc<Engine>, retriever: Arc<dyn Retriever>) -> Self {
        Self { engine, retriever }
    }

    /// Ask the retrieval collaborator, then run the engine turn and
    /// project the selection for the canvas.
    pub async fn run_query(
        &self,
        query: &str,
        history: &[ChatMessage],
    ) -> anyhow::Result<QueryOutcome> {
        let started = Instant::now();
        let response = self.retriever.answer(query, history).await?;
        let elapsed = started.elapsed().as_secs_f64();

        let outcome = self
            .engine
            .handle_turn(query, &response, elapsed, epoch_secs());

        let graph = weft_viz::project(&outcome.selection, &outcome.snapshot, self.engine.tracker());

        let mut entities: Vec<String> = outcome
            .focal
            .iter()
            .map(|id| {
                outcome
                    .snapshot
                    .entity(id)
                    .map(|e| e.label.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        entities.sort();

        Ok(QueryOutcome {
            response,
            graph,
            entities,
            processing_time: elapsed,
        })
    }
}

/// Wall-clock seconds, the timestamp the engine's decay math runs on.
pub fn epoch_secs() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
