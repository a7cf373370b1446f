//! Hybrid file encryption core.
//!
//! A file is encrypted under a fresh symmetric key ([`cipher`]), the key is
//! wrapped under the recipient's RSA public key with OAEP-SHA256 ([`keys`]),
//! and both parts are framed into one package ([`package`]). [`pipeline`]
//! composes the three in each direction.
//!
//! # Package format
//!
//! ```text
//! len(wrapped_key) as u32 BE ‖ wrapped_key ‖ token
//! ```
//!
//! This crate does no I/O and holds no state. Keys are parsed by the caller
//! and shared read-only across threads.
//!
//! # Security invariants
//!
//! - Symmetric keys are zeroed on drop and never logged.
//! - Unwrap and token failures are reported with the same message; see
//!   [`EnvelopeError::is_decryption_failure`].

pub mod cipher;
pub mod error;
pub mod keys;
pub mod package;
pub mod pipeline;

pub use cipher::{SymmetricKey, Token};
pub use error::{EnvelopeError, EnvelopeResult, FramingError};
pub use keys::{PrivateKey, PublicKey, WrappedKey};
pub use pipeline::{pack_file, unpack_file};
