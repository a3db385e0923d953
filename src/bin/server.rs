use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use tailprob::env_config;
use tailprob::server::{create_router, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_config::init_tracing();
    let port = env_config::server_port();
    let default_sims = env_config::default_sims();
    let max_sims = env_config::max_sims();
    env_config::init_rayon_threads();
    info!(port, default_sims, max_sims, "starting tailprob API server");

    let app = create_router(Arc::new(ServerConfig {
        default_sims,
        max_sims,
    }));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    info!("server is running on port {}, press Ctrl+C to stop", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("stopping server");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
}
