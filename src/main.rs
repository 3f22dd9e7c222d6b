use std::time::Duration;

use deferstats::{Client, ClientConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod handlers;
mod server;

/// How long queued reports get to go out after the server stops.
const DRAIN_WINDOW: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deferstats=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 1. Configuration ─────────────────────────────────────────
    let config = ClientConfig::from_env()?;
    tracing::info!(
        stats_url = %config.stats_url,
        latency_threshold = ?config.latency_threshold,
        "configuration loaded"
    );

    // ── 2. Client + router ───────────────────────────────────────
    let client = Client::with_config(config)?;
    let app = server::create_router(client.clone());

    // ── 3. Bind & serve ──────────────────────────────────────────
    let addr = std::env::var("DEFERSTATS_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // ── 4. Flush what we can ─────────────────────────────────────
    let drained = client.shutdown(DRAIN_WINDOW).await;
    tracing::info!(drained, "stats reporter stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
