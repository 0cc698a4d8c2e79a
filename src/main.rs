use anyhow::Context;
use tracing_subscriber::EnvFilter;

use imgmotion_api::config::AppConfig;
use imgmotion_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SUPABASE_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting imgMotionMagic API in {:?} mode", config.environment);
    if config.supabase.jwt_secret.is_empty() {
        tracing::warn!("SUPABASE_JWT_SECRET is not set; every authenticated request will be rejected");
    }

    let port = config.server.port;
    let state = AppState::from_config(config).context("failed to build application state")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("imgMotionMagic API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
