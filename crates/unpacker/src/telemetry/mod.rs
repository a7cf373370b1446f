//! Telemetry for the unpacker: structured JSON logs, plus OTLP span export
//! when a collector endpoint is configured.
//!
//! No plaintext or key material may appear in any span attribute or log
//! field. Sizes, filenames, and error codes only.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
