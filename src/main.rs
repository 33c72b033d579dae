use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use cuidame::cli::Cli;
use cuidame::logging::init_tracing;
use cuidame::router::init_router;
use cuidame::state::AppState;
use cuidame_config::LogConfig;
use cuidame_db::{DatabaseConfig, init_db_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = init_tracing(&LogConfig::from_env());

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_db_pool(&db_config)
        .await
        .context("failed to connect to the database")?;

    if cli.skip_migrations {
        tracing::warn!("Skipping database migrations");
    } else {
        run_migrations(&pool)
            .await
            .context("failed to run database migrations")?;
    }

    let state = AppState::from_env(pool);
    let app = init_router(state);

    let address = cli.server_config().bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(%address, "CuidaMe API listening");
    tracing::info!("API reference available at http://{address}/scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal");
    }
}
