//! Weft Web — conversational knowledge-graph exploration server.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use weft_core::config::EngineConfig;
use weft_engine::{Engine, GraphStore};

mod retriever;
mod routes;
mod state;

pub use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "weft-web")]
#[command(about = "Chat with a document corpus while watching its knowledge graph")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Path to the serialized knowledge graph (may not exist yet)
    #[arg(short, long, default_value = "data/graph.json")]
    graph: PathBuf,

    /// Optional engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);

    let config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };

    let store = GraphStore::open(&cli.graph);
    if !store.graph_ready() {
        tracing::warn!(
            "graph not yet built at {}; serving an empty canvas until ingestion completes",
            cli.graph.display()
        );
    }
    let engine = Engine::new(store, config)?;
    let state = AppState::new(Arc::new(engine), Arc::new(retriever::EchoRetriever));

    let app = routes::create_router(state);

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
