//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use envelope::PrivateKey;

use crate::content_type::ContentTypeDetector;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Recipient private key used to unwrap every package.
    pub recipient: Arc<PrivateKey>,
    /// Picks the `Content-Type` of recovered plaintext.
    pub detector: Arc<dyn ContentTypeDetector>,
}

impl AppState {
    /// Create a new [`AppState`] from the loaded private key and a detector.
    pub fn new(recipient: PrivateKey, detector: impl ContentTypeDetector + 'static) -> Self {
        Self {
            recipient: Arc::new(recipient),
            detector: Arc::new(detector),
        }
    }
}
