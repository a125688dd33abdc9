//! ShareIt Gateway
//!
//! Public entry point: validates requests and forwards them to the server.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use shareit::{
    config::AppConfig,
    gateway::{self, GatewayClient, GatewayState},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging, "shareit");

    tracing::info!(
        "Starting ShareIt gateway v{} forwarding to {}",
        env!("CARGO_PKG_VERSION"),
        config.gateway.server_url
    );

    let client = GatewayClient::new(&config.gateway).context("Failed to build HTTP client")?;
    let state = GatewayState {
        client: Arc::new(client),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = gateway::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr = SocketAddr::new(
        config.gateway.host.parse().context("Invalid host address")?,
        config.gateway.port,
    );

    tracing::info!("Gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
