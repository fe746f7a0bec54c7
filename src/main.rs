// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake Service
//!
//! Receives contact form submissions on `POST /send-email`, validates and
//! rate-limits them, and forwards each accepted one as an HTML email.
//!
//! ## Configuration
//!
//! Configuration is loaded from an optional TOML file and environment
//! variables:
//!
//! - `CONTACT_CONFIG`: Config file path (default: contact-intake.toml)
//! - `CONTACT__BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `CONTACT__RATE_LIMIT__MAX_ATTEMPTS`: Submissions per window (default: 3)
//! - `CONTACT__RATE_LIMIT__WINDOW_MS`: Window length (default: 3600000)
//! - `CONTACT__MAIL__TO`: Comma-separated recipients
//! - `RESEND_API_KEY`: Mail provider key; without it messages are only logged

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_intake::{
    config::Config,
    gateway::IntakeGateway,
    handlers::{router, AppState},
    limiter::RateLimiter,
    mailer,
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
    let config = Config::load()?;
    info!(
        bind_addr = %config.bind_addr,
        max_attempts = config.rate_limit.max_attempts,
        window_ms = config.rate_limit.window_ms,
        recipients = config.mail.to.len(),
        "Starting contact intake service"
    );

    if config.mail.api_key.is_none() {
        warn!("No mail provider API key configured, submissions will only be logged");
    }

    // Create application state
    let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
    let mailer = mailer::from_config(&config.mail)?;
    let gateway = IntakeGateway::new(&config, limiter, mailer)?;

    let state = Arc::new(AppState {
        gateway,
        config: config.clone(),
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
