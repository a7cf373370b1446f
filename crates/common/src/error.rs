//! Common error types shared across crates.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use envelope::EnvelopeError;
use thiserror::Error;

use crate::protocol::ErrorResponse;

/// Message returned for every unwrap or token failure. Callers cannot tell
/// which layer rejected the package.
pub const DECRYPTION_FAILED_MESSAGE: &str = "wrong key or corrupted package";

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::DecryptionFailed`] → 400
/// - [`ServiceError::PayloadTooLarge`] → 413
/// - [`ServiceError::EncryptionFailure`] → 500
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: missing upload field, malformed package.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The package could not be opened with the configured private key.
    #[error("decryption failed: wrong key or corrupted package")]
    DecryptionFailed,

    /// Encryption failed due to a crypto-layer error.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// The upload exceeded the configured body limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::DecryptionFailed => 400,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::PayloadTooLarge(_) => 413,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`ErrorResponse::code`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::DecryptionFailed => "decryption_failed",
            ServiceError::EncryptionFailure(_) => "encryption_failed",
            ServiceError::PayloadTooLarge(_) => "payload_too_large",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Response body safe to expose to callers.
    ///
    /// Internal failures get a generic message; their detail belongs in logs.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ServiceError::BadRequest(m) => m.clone(),
            ServiceError::DecryptionFailed => DECRYPTION_FAILED_MESSAGE.into(),
            ServiceError::EncryptionFailure(_) => "encryption failed".into(),
            ServiceError::PayloadTooLarge(m) => m.clone(),
            ServiceError::Internal(_) => "internal server error".into(),
        };
        ErrorResponse::new(self.code(), message)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}

impl From<EnvelopeError> for ServiceError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::Framing(f) => ServiceError::BadRequest(f.to_string()),
            EnvelopeError::Unwrap | EnvelopeError::Integrity => ServiceError::DecryptionFailed,
            EnvelopeError::Wrap => ServiceError::EncryptionFailure(EnvelopeError::Wrap.to_string()),
            EnvelopeError::InvalidKey(m) => ServiceError::Internal(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envelope::FramingError;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ServiceError::DecryptionFailed.http_status(), 400);
        assert_eq!(
            ServiceError::EncryptionFailure("x".into()).http_status(),
            500
        );
        assert_eq!(ServiceError::PayloadTooLarge("x".into()).http_status(), 413);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("missing file field".into());
        assert!(e.to_string().contains("missing file field"));
    }

    #[test]
    fn framing_maps_to_bad_request() {
        let e = ServiceError::from(EnvelopeError::from(FramingError::TooShort));
        assert_eq!(e.http_status(), 400);
        assert_eq!(e.code(), "bad_request");
        assert!(e.to_response().message.contains("too short"));
    }

    #[test]
    fn unwrap_and_integrity_are_indistinguishable() {
        let a = ServiceError::from(EnvelopeError::Unwrap).to_response();
        let b = ServiceError::from(EnvelopeError::Integrity).to_response();
        assert_eq!(a.code, b.code);
        assert_eq!(a.message, b.message);
        assert_eq!(a.code, "decryption_failed");
    }

    #[test]
    fn internal_detail_not_exposed() {
        let e = ServiceError::from(EnvelopeError::InvalidKey("/etc/keys/key.pem".into()));
        assert_eq!(e.http_status(), 500);
        assert!(!e.to_response().message.contains("/etc/keys"));
    }

    #[test]
    fn into_response_uses_status_and_code() {
        let resp = ServiceError::DecryptionFailed.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = ServiceError::Internal("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn wrap_maps_to_encryption_failure() {
        let e = ServiceError::from(EnvelopeError::Wrap);
        assert_eq!(e.http_status(), 500);
        assert_eq!(e.code(), "encryption_failed");
    }
}
