//! # Audio Upload Service - Main Application Entry Point
//!
//! HTTP service that accepts base64-encoded audio recordings with patient
//! metadata, writes the audio to an object store and a metadata record to a
//! key-value store.
//!
//! ## Endpoints:
//! - `OPTIONS *`: CORS preflight
//! - `GET /status`: liveness message
//! - `POST /upload`: store one recording and its metadata
//!
//! ## Application Architecture:
//! - **config**: configuration (TOML file + environment variables)
//! - **state**: immutable config plus injected store handles
//! - **storage**: object/metadata store traits and backends
//! - **models**: upload payload and persisted record
//! - **handlers**: router, upload flow, actix adapter
//! - **health**: `/status` response
//! - **middleware**: request logging
//! - **error**: typed upload errors and their status mapping

mod config;
mod error;
mod handlers;
mod health;
mod middleware;
mod models;
mod state;
mod storage;

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use crate::config::AppConfig;
use crate::state::AppState;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The main application entry point.
///
/// ## What this function does:
/// 1. **Loads configuration** from files and environment variables
/// 2. **Sets up logging**
/// 3. **Builds the stores** and the shared application state
/// 4. **Runs the HTTP server** until it exits or a shutdown signal arrives
///
/// Missing bucket or table configuration is fatal: `validate` fails and the
/// process exits before binding.
#[actix_web::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting audio-upload-service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        bucket = %config.storage.bucket,
        table = %config.storage.table,
        backend = ?config.storage.backend,
        allow_origin = %config.cors.allow_origin,
        typed_status_codes = config.errors.typed_status_codes,
        "Configuration loaded"
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let max_body_bytes = config.server.max_body_bytes;
    let app_state = AppState::new(config);

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .wrap(middleware::RequestLogging)
            // Every method and path goes through the router, which owns CORS
            // and the 404 fallback.
            .default_service(web::to(handlers::dispatch))
    })
    .disable_signals()
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(Err(e)) => error!("Server error: {}", e),
                Err(e) => error!("Server task error: {}", e),
                Ok(Ok(())) => {}
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Initialize tracing.
///
/// ## Environment Variables:
/// - `RUST_LOG`: log filter, defaults to "audio_upload_service=debug,actix_web=info"
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "audio_upload_service=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}

/// Resolve on SIGTERM or SIGINT (Ctrl+C).
///
/// In-flight uploads are allowed to finish because the server is stopped
/// gracefully once this returns.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received SIGINT");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C");
        }
    }
}
