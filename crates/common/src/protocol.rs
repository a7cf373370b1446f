//! JSON bodies exchanged over the public HTTP API.
//!
//! Packages and plaintext travel as raw bytes; only errors and health checks
//! are JSON.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Upload form
// ---------------------------------------------------------------------------

/// Name of the multipart field carrying the uploaded file on both services.
pub const FILE_FIELD: &str = "file";

/// Filename prefix the packer gives to packages.
pub const PACKAGE_PREFIX: &str = "encrypted_";

/// Filename suffix the packer gives to packages.
pub const PACKAGE_SUFFIX: &str = ".fernet";

/// Filename prefix the unpacker substitutes for [`PACKAGE_PREFIX`].
pub const PLAINTEXT_PREFIX: &str = "decrypted_";

/// Download name for a package built from `original`.
pub fn package_file_name(original: &str) -> String {
    format!("{PACKAGE_PREFIX}{original}{PACKAGE_SUFFIX}")
}

/// Download name for the plaintext recovered from `package_name`.
///
/// `encrypted_report.pdf.fernet` becomes `decrypted_report.pdf`.
pub fn plaintext_file_name(package_name: &str) -> String {
    package_name
        .replace(PACKAGE_PREFIX, PLAINTEXT_PREFIX)
        .replace(PACKAGE_SUFFIX, "")
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status; always `"ok"` once the service is listening.
    pub status: String,
    /// Which side of the exchange answered: `"packer"` or `"unpacker"`.
    pub service: String,
    /// Crate version of the answering binary.
    pub version: String,
    /// RSA modulus size of the loaded key, in bits.
    pub key_bits: usize,
}
