//! Common types, protocol definitions, and errors shared by the `packer` and
//! `unpacker` services.

pub mod error;
pub mod protocol;
pub mod upload;

pub use error::ServiceError;
