//! HTTP surface of the packer: `/encrypt`, `/health` and the shared state
//! holding the recipient key.

pub mod handlers;
pub mod router;
pub mod state;
