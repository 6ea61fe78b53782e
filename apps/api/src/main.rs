mod config;
mod errors;
mod extract;
mod models;
mod parser_client;
mod parsing;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::parser_client::ParserClient;
use crate::parsing::collaborators::PlatformClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvflow API v{}", env!("CARGO_PKG_VERSION"));

    // Client for the structured-data extraction service (120s per-call timeout)
    let parser = Arc::new(ParserClient::new(config.parser_url.clone()));
    info!("Parser client initialized ({})", config.parser_url);

    // Untimed client for stored-CV downloads; stored documents can be large
    let downloads = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()?;

    // The core platform API owns application records and saved lists
    let platform = Arc::new(PlatformClient::new(
        downloads.clone(),
        config.platform_api_url.clone(),
    ));
    info!("Platform client initialized ({})", config.platform_api_url);

    let state = AppState {
        parser,
        downloads,
        applications: platform.clone(),
        saved_lists: platform,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
