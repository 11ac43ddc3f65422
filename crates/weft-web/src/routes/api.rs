//! REST API endpoints.

use crate::retriever::ChatMessage;
use crate::state::{epoch_secs, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use weft_core::types::{ConversationStats, ScoredNode, SelectedSubgraph, SelectionStrategy};
use weft_engine::extract::resolve_labels;
use weft_engine::GraphSnapshot;
use weft_viz::VisGraph;

/// Query request body.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
    #[serde(default = "default_include_graph")]
    pub include_graph: bool,
}

fn default_include_graph() -> bool {
    true
}

/// Query response.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub graph: Option<VisGraph>,
    pub entities: Vec<String>,
    pub processing_time: f64,
}

/// Answer one conversational turn.
pub async fn query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, StatusCode> {
    let outcome = state
        .run_query(&req.query, &req.conversation_history)
        .await
        .map_err(|e| {
            tracing::error!("retrieval failed: {}", e);
            StatusCode::BAD_GATEWAY
        })?;

    Ok(Json(QueryResponse {
        response: outcome.response,
        graph: req.include_graph.then_some(outcome.graph),
        entities: outcome.entities,
        processing_time: outcome.processing_time,
    }))
}

/// The whole current graph, sized by centrality.
pub async fn full_graph(State(state): State<AppState>) -> Json<VisGraph> {
    let snapshot = state.engine.store().current();
    let selection = whole_graph_selection(&snapshot);
    Json(weft_viz::project(
        &selection,
        &snapshot,
        state.engine.tracker(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SubgraphParams {
    /// Comma-separated entity labels.
    pub entities: Option<String>,
}

/// Contextual subgraph seeded from explicit labels.
pub async fn subgraph(
    State(state): State<AppState>,
    Query(params): Query<SubgraphParams>,
) -> Result<Json<VisGraph>, StatusCode> {
    let raw = params.entities.ok_or(StatusCode::BAD_REQUEST)?;
    let labels: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    if labels.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let snapshot = state.engine.store().current();
    let focal = resolve_labels(labels.iter().copied(), &snapshot);
    if focal.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    let (snapshot, selection) = state.engine.select_for(&focal, epoch_secs());
    Ok(Json(weft_viz::project(
        &selection,
        &snapshot,
        state.engine.tracker(),
    )))
}

/// Aggregate conversation statistics.
pub async fn stats(State(state): State<AppState>) -> Json<ConversationStats> {
    Json(state.engine.stats())
}

/// Reload request body: the ingestion-completed trigger, optionally
/// pointing at a new graph location.
#[derive(Debug, Deserialize)]
pub struct ReloadRequest {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub graph_ready: bool,
    /// The source the store is currently pointed at.
    pub source: String,
    pub graph_node_count: usize,
    pub graph_edge_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Swap in a freshly ingested graph. Failure is non-fatal: the previous
/// snapshot keeps serving and the flag tells the UI the graph is not
/// (re)built yet.
pub async fn reload(
    State(state): State<AppState>,
    Json(req): Json<ReloadRequest>,
) -> Json<ReloadResponse> {
    let store = state.engine.store();
    let result = match req.path {
        Some(path) => store.reload_from(path),
        None => store.reload(),
    };

    let snapshot = store.current();
    let source = store.source().display().to_string();
    match result {
        Ok(()) => Json(ReloadResponse {
            status: "reloaded",
            graph_ready: store.graph_ready(),
            source,
            graph_node_count: snapshot.node_count(),
            graph_edge_count: snapshot.edge_count(),
            error: None,
        }),
        Err(e) => {
            tracing::warn!("graph reload failed: {}", e);
            Json(ReloadResponse {
                status: "failed",
                graph_ready: store.graph_ready(),
                source,
                graph_node_count: snapshot.node_count(),
                graph_edge_count: snapshot.edge_count(),
                error: Some(e.to_string()),
            })
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub graph_ready: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        graph_ready: state.engine.store().graph_ready(),
    })
}

/// Render every node, sized by raw centrality. Used by the full-graph
/// view where no conversational focus applies.
fn whole_graph_selection(snapshot: &GraphSnapshot) -> SelectedSubgraph {
    let mut nodes: Vec<ScoredNode> = snapshot
        .entities()
        .map(|e| ScoredNode {
            id: e.id.clone(),
            score: snapshot.centrality_of(&e.id),
            is_focal: false,
        })
        .collect();
    nodes.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    let edges = snapshot.relations().cloned().collect();
    SelectedSubgraph {
        nodes,
        edges,
        strategy: SelectionStrategy::CentralityFallback,
    }
}
