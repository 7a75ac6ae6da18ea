// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Service
//!
//! Receives contact form posts, rate-limits and validates them, and pushes
//! a notification to the site owner through ntfy.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and `.env`):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `NTFY_TOPIC`: Topic to publish to (required for delivery)
//! - `NTFY_BASE_URL`: ntfy server (default: https://ntfy.sh)
//! - `RATE_LIMIT_WINDOW_MS`: Window length (default: 900000)
//! - `RATE_LIMIT_MAX_REQUESTS`: Submissions per window per client (default: 3)
//! - `NOTIFY_TIMEOUT_MS`: Outbound call timeout (default: 10000)
//! - `TRUST_FORWARDED_FOR`: Use `X-Forwarded-For` as client identity (default: false)
//! - `ALLOWED_ORIGINS`: Comma-separated CORS origins (default: none)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{
    clock::SystemClock,
    config::Config,
    handlers::{router, AppState},
    metrics::Metrics,
    pipeline::SubmissionHandler,
    store::MemoryStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "Failed to read .env file");
        }
    }
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        window_ms = config.rate_limit.window_ms,
        max_requests = config.rate_limit.max_requests,
        notify_timeout_ms = config.notify.timeout_ms,
        "Starting contact relay"
    );

    // Create application state
    let handler = SubmissionHandler::from_config(
        &config,
        Arc::new(MemoryStore::new()),
        Arc::new(SystemClock),
    )?;
    let state = Arc::new(AppState {
        handler,
        metrics: Metrics::new()?,
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let period = cleanup_state.config.rate_limit.cleanup_interval();
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match cleanup_state.handler.limiter().cleanup().await {
                Ok(tracked) => cleanup_state.metrics.set_tracked_clients(tracked),
                Err(e) => warn!(error = %e, "Rate limit cleanup failed"),
            }
        }
    });

    // Start server
    let app = router(state);
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
