//! Configuration loading and validation for the unpacker service.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use serde::Deserialize;

/// Validated unpacker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Filesystem path to the recipient's PEM-encoded RSA private key.
    /// **Required.**
    pub private_key_path: String,

    /// TCP port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Comma-separated browser origins allowed to call `/decrypt`.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    /// OTLP/gRPC collector endpoint. Span export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8001
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}
fn default_allowed_origins() -> String {
    "http://127.0.0.1:8000,http://localhost:8000".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build unpacker configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise unpacker configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Parsed CORS origins. Blank entries are skipped.
    pub fn origins(&self) -> Result<Vec<HeaderValue>> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| {
                if o == "*" {
                    anyhow::bail!("ALLOWED_ORIGINS must list explicit origins, not `*`");
                }
                HeaderValue::from_str(o)
                    .with_context(|| format!("ALLOWED_ORIGINS entry {o:?} is not a valid header value"))
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.private_key_path.trim().is_empty() {
            anyhow::bail!("PRIVATE_KEY_PATH is required and must not be empty");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be > 0");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            if endpoint.trim().is_empty() {
                anyhow::bail!("OTEL_EXPORTER_OTLP_ENDPOINT must not be empty when set");
            }
        }
        self.origins()?;
        Ok(())
    }
}
