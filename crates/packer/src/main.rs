//! `packer`: encrypt-side service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Load the recipient certificate and extract its RSA public key.
//! 4. Build the Axum router and start the HTTP server.

mod config;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use envelope::PublicKey;
use tracing::info;

use config::Config;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: packer configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "packer starting"
    );

    // -----------------------------------------------------------------------
    // 3. Recipient key
    // -----------------------------------------------------------------------
    let pem = tokio::fs::read(&cfg.certificate_path)
        .await
        .with_context(|| format!("failed to read certificate {}", cfg.certificate_path))?;
    let recipient =
        PublicKey::from_certificate_pem(&pem).context("failed to load recipient certificate")?;
    info!(
        key_bits = recipient.modulus_len() * 8,
        "recipient certificate loaded"
    );

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(recipient);
    let router = server::router::build(state, cfg.max_upload_bytes);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router).await?;

    Ok(())
}
