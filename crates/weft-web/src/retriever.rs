//! The retrieval collaborator boundary.
//!
//! The engine that actually answers questions (a LightRAG-style hybrid
//! retriever) lives outside this repository; the server only needs its
//! answer text. Implementations plug in here.

use async_trait::async_trait;

/// One prior turn of the conversation, as the client replays it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Produces the answer text for a query. Pluggable; the real
/// implementation proxies an external retrieval engine.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn answer(&self, query: &str, history: &[ChatMessage]) -> anyhow::Result<String>;
}

/// Offline stand-in so the server runs without the external engine:
/// echoes the query back. Entity extraction still fires on the query
/// text, so the canvas stays useful for graph exploration.
pub struct EchoRetriever;

#[async_trait]
impl Retriever for EchoRetriever {
    async fn answer(&self, query: &str, _history: &[ChatMessage]) -> anyhow::Result<String> {
        Ok(format!(
            "No retrieval engine is connected. You asked: {}",
            query
        ))
    }
}
