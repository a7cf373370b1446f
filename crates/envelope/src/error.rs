//! Error taxonomy for the packaging protocol.
//!
//! Unwrap and integrity failures deliberately share one `Display` message.
//! Callers outside this crate must not be able to tell whether the RSA layer
//! or the token layer rejected a package.

use thiserror::Error;

/// Message shared by every "could not recover plaintext" failure.
pub const DECRYPTION_FAILED: &str = "could not recover plaintext";

/// A package whose length prefix and key region cannot be split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    /// Fewer than four bytes; the length prefix itself is missing.
    #[error("package too short")]
    TooShort,

    /// The declared wrapped-key length runs past the end of the package.
    #[error("package truncated: key region declares {declared} bytes, {available} available")]
    Truncated {
        /// Length read from the prefix.
        declared: usize,
        /// Bytes actually present after the prefix.
        available: usize,
    },

    /// The wrapped key is too long for the 32-bit length prefix.
    #[error("wrapped key of {0} bytes does not fit the length prefix")]
    KeyTooLong(usize),
}

/// Errors produced by the envelope core.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The package could not be split into wrapped key and token.
    #[error("malformed package: {0}")]
    Framing(#[from] FramingError),

    /// The symmetric key could not be wrapped under the recipient key.
    #[error("key wrapping failed")]
    Wrap,

    /// The wrapped key could not be recovered with the given private key.
    #[error("could not recover plaintext")]
    Unwrap,

    /// The token failed authentication or was malformed.
    #[error("could not recover plaintext")]
    Integrity,

    /// Key material supplied by a key provider could not be parsed.
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

impl EnvelopeError {
    /// Returns `true` for the single opaque "wrong key or corrupted data" category.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, EnvelopeError::Unwrap | EnvelopeError::Integrity)
    }
}

/// Result alias used throughout the crate.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;
