//! Configuration loading and validation for the packer service.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated packer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Filesystem path to the recipient's PEM-encoded X.509 certificate.
    /// **Required.**
    pub certificate_path: String,

    /// TCP port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8000
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
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
            .context("failed to build packer configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise packer configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.certificate_path.trim().is_empty() {
            anyhow::bail!("CERTIFICATE_PATH is required and must not be empty");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            certificate_path: "certificate.pem".into(),
            listen_port: default_listen_port(),
            max_upload_bytes: default_max_upload_bytes(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(default_listen_port(), 8000);
        assert_eq!(default_max_upload_bytes(), 52_428_800);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_certificate_path() {
        let cfg = Config {
            certificate_path: "  ".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_upload_limit() {
        let cfg = Config {
            max_upload_bytes: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }
}
