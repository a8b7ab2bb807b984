//! EduMind gateway server
//!
//! Serves the proxy and session routes over HTTP.

use edumind_gateway::api::{create_router, AppState};
use edumind_gateway::config::GatewayConfig;
use edumind_gateway::i18n::Catalog;
use edumind_gateway::proxy::{Routes, UpstreamClient};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edumind_gateway=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = GatewayConfig::from_env()?;
    let catalog = Catalog::load(config.missing_key_policy)?;
    let upstream = UpstreamClient::new(&config.upstream_url, config.upstream_timeout, Routes::UPSTREAM)?;

    tracing::info!(
        upstream = %upstream.base_url(),
        timeout_secs = ?config.upstream_timeout.map(|t| t.as_secs()),
        language = %config.language,
        policy = ?catalog.policy(),
        "Gateway configured"
    );

    // Create application state
    let state = AppState::new(upstream, catalog, config.language, config.upstream_timeout);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("EduMind gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
