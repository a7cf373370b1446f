//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use envelope::PublicKey;

/// Application state shared across all request handlers.
///
/// The recipient key is immutable after startup, so handlers share it
/// through an `Arc` without locking.
#[derive(Clone)]
pub struct AppState {
    /// Public key every uploaded file is packed for.
    pub recipient: Arc<PublicKey>,
}

impl AppState {
    /// Create a new [`AppState`] around the recipient key.
    pub fn new(recipient: PublicKey) -> Self {
        Self {
            recipient: Arc::new(recipient),
        }
    }
}
