//! WebSocket handler for streaming chat turns.

use crate::retriever::ChatMessage;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use serde::Deserialize;
use weft_viz::VisGraph;

/// Messages the client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Query {
        query: String,
        #[serde(default)]
        conversation_history: Vec<ChatMessage>,
    },
    Ping,
}

/// WebSocket upgrade handler for /ws.
pub async fn chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection: one query in, one response out, until
/// the client hangs up.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // Tell the client whether a graph is loaded yet
    let ready = serde_json::json!({
        "type": "status",
        "graph_ready": state.engine.store().graph_ready(),
    });
    if let Ok(json) = serde_json::to_string(&ready) {
        if socket.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    while let Some(msg) = socket.recv().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(_) => break,
        };

        let parsed = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                send_error(&mut socket, &format!("invalid message: {}", e)).await;
                continue;
            }
        };

        match parsed {
            ClientMessage::Ping => {
                let pong = serde_json::json!({ "type": "pong" });
                if let Ok(json) = serde_json::to_string(&pong) {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            ClientMessage::Query {
                query,
                conversation_history,
            } => match state.run_query(&query, &conversation_history).await {
                Ok(outcome) => {
                    if send_response(
                        &mut socket,
                        &outcome.response,
                        &outcome.graph,
                        &outcome.entities,
                        outcome.processing_time,
                    )
                    .await
                    .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("retrieval failed over ws: {}", e);
                    send_error(&mut socket, &e.to_string()).await;
                }
            },
        }
    }
}

async fn send_response(
    socket: &mut WebSocket,
    response: &str,
    graph: &VisGraph,
    entities: &[String],
    processing_time: f64,
) -> Result<(), axum::Error> {
    let msg = serde_json::json!({
        "type": "response",
        "response": response,
        "graph": graph,
        "entities": entities,
        "processing_time": processing_time,
    });
    match serde_json::to_string(&msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(_) => Ok(()),
    }
}

async fn send_error(socket: &mut WebSocket, error: &str) {
    let msg = serde_json::json!({
        "type": "error",
        "error": error,
    });
    if let Ok(json) = serde_json::to_string(&msg) {
        let _ = socket.send(Message::Text(json.into())).await;
    }
}
