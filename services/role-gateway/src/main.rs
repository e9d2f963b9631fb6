use anyhow::Context;
use role_gateway::{build_router, AppState, GatewayConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from_env()?;
    let addr = config.bind_addr();
    info!(role_universe = %config.role_universe, "Loaded role universe");

    let state = AppState::new(config)?;
    let app = build_router(state).context("invalid route policy")?;

    info!("starting role-gateway on {addr}");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
