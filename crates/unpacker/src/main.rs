//! `unpacker`: decrypt-side service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise telemetry (JSON logs, optional OTLP span export).
//! 3. Load the recipient RSA private key.
//! 4. Build the Axum router and start the HTTP server.

mod config;
mod content_type;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use envelope::PrivateKey;
use tracing::info;

use config::Config;
use content_type::MagicBytesDetector;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        eprintln!("ERROR: unpacker configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        otlp_export = cfg.otel_exporter_otlp_endpoint.is_some(),
        "unpacker starting"
    );

    // -----------------------------------------------------------------------
    // 3. Recipient key
    // -----------------------------------------------------------------------
    let pem = tokio::fs::read(&cfg.private_key_path)
        .await
        .with_context(|| format!("failed to read private key {}", cfg.private_key_path))?;
    let recipient = PrivateKey::from_pem(&pem).context("failed to load recipient private key")?;
    info!(
        key_bits = recipient.modulus_len() * 8,
        "recipient private key loaded"
    );

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(recipient, MagicBytesDetector);
    let router = server::router::build(state, cfg.max_upload_bytes, cfg.origins()?);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let served = axum::serve(listener, router).await;

    telemetry::shutdown_telemetry();
    served.context("server error")
}
