mod config;
mod detection;
mod errors;
mod extraction;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::generator::PrepGenerator;
use crate::llm_client::{CompletionBackend, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PrepStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HirePrep API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize local store
    let backend: Arc<dyn KeyValueStore> = match &config.data_dir {
        Some(dir) => Arc::new(FileKeyValueStore::open(dir)?),
        None => {
            warn!("DATA_DIR is empty; saved inputs and history are kept in memory only");
            Arc::new(MemoryKeyValueStore::new())
        }
    };
    let store = PrepStore::open(backend);

    // Initialize LLM client
    let completion: Option<Arc<dyn CompletionBackend>> = match &config.openai_api_key {
        Some(key) => {
            let client = LlmClient::new(
                key.clone(),
                &config.openai_base_url,
                config.llm_stream,
                Duration::from_secs(config.llm_timeout_secs),
            )?;
            info!(
                "LLM client initialized (model: {}, stream: {})",
                llm_client::MODEL,
                config.llm_stream
            );
            Some(Arc::new(client))
        }
        None => {
            warn!("OPENAI_API_KEY is not set; generation requests will fail");
            None
        }
    };

    // Build app state
    let state = AppState::new(config.clone(), PrepGenerator::new(completion), store);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
