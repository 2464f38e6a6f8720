mod ai;
mod assessment;
mod auth;
mod config;
mod errors;
mod jobs;
mod models;
mod reports;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai::GeminiClient;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AssessPro API v{}", env!("CARGO_PKG_VERSION"));

    // Open the JSON-file store
    let store = Store::open(&config.data_dir)?;
    info!("Store opened at {}", config.data_dir);

    // Initialize the Gemini gateway
    let ai = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    info!(
        "AI gateway initialized (generation: {}, evaluation: {})",
        ai::client::GENERATION_MODEL,
        ai::client::EVALUATION_MODEL
    );

    // Build app state
    let state = AppState {
        store,
        ai,
        attempts: Default::default(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
