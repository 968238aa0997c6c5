//! pos-server: ordering core for the storefront and admin panel
//!
//! Long-running service that:
//! - Materializes carts into priced orders
//! - Drives order / payment status (staff actions and gateway callbacks)
//! - Renders customer receipts and kitchen tickets

use pos_server::error::BoxError;
use pos_server::{AppState, Config, api, init_logger_with_file};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );

    tracing::info!("Starting pos-server (env: {})", config.environment);
    if config.is_development() {
        tracing::warn!("Development mode: payments are mocked");
    }

    let state = AppState::new(&config).await?;
    let app = api::build_app(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("pos-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("pos-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
