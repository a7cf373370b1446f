//! Axum HTTP server for the unpacker.
//!
//! Routes, CORS and compression middleware, and the shared [`state::AppState`].

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
