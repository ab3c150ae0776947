//! HTTP listener.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use omnigate_core::GatewayConfig;

use crate::routes::create_router;
use crate::service::Gateway;

/// Build the gateway from `config` and serve it until Ctrl-C.
pub async fn start_server(config: &GatewayConfig) -> Result<()> {
    let gateway = Gateway::from_config(config)?;
    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    serve(listener, gateway).await
}

/// Serve `gateway` on an already-bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, gateway: Gateway) -> Result<()> {
    let app = create_router(gateway).layer(TraceLayer::new_for_http());

    info!(address = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => warn!(error = %e, "failed to listen for Ctrl-C, shutting down"),
    }
}
