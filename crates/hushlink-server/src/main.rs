mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing::info;

use hushlink_ai::GeminiClient;
use hushlink_api::{AppState, AppStateInner};
use hushlink_db::{Database, MemoryStore, Store};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hushlink=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = if config.uses_memory_store() {
        info!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(Database::open(&config.db_path)?)
    };

    let model = GeminiClient::new(config.model.clone())?;
    info!("Moderation and summaries via model {}", model.model());

    let state: AppState = Arc::new(AppStateInner {
        store,
        model,
        public_url: config.public_url.clone(),
    });

    let app = hushlink_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(hushlink_api::trace_layer());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Hushlink listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
