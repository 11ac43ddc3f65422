//! HTTP and WebSocket routes.

mod api;
mod ws;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Conversation
        .route("/api/query", post(api::query))
        // Graph views
        .route("/api/graph/full", get(api::full_graph))
        .route("/api/graph/subgraph", get(api::subgraph))
        .route("/api/graph/reload", post(api::reload))
        // Display counters
        .route("/api/stats", get(api::stats))
        .route("/api/health", get(api::health))
        // WebSocket chat
        .route("/ws", get(ws::chat_handler))
        // CORS for the canvas frontend during development
        .layer(CorsLayer::permissive())
        .with_state(state)
}
