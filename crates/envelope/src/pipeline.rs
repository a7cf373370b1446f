//! Encrypt and decrypt orchestration over the three primitives.
//!
//! Both directions are stateless, synchronous and single-shot. The symmetric
//! key never leaves these functions: it is dropped (and zeroed) as soon as it
//! has been wrapped or used.

use bytes::Bytes;
use tracing::debug;

use crate::cipher;
use crate::error::EnvelopeResult;
use crate::keys::{PrivateKey, PublicKey};
use crate::package;

/// Encrypt `plaintext` for the holder of `recipient`'s private key.
///
/// # Errors
///
/// Returns [`EnvelopeError::Wrap`](crate::EnvelopeError::Wrap) if the
/// recipient key cannot carry the symmetric key.
pub fn pack_file(plaintext: &[u8], recipient: &PublicKey) -> EnvelopeResult<Bytes> {
    let (key, token) = cipher::encrypt(plaintext)?;
    let wrapped = recipient.wrap(&key)?;
    drop(key);

    let package = package::encode(&wrapped, &token)?;
    debug!(
        plaintext_len = plaintext.len(),
        wrapped_key_len = wrapped.len(),
        package_len = package.len(),
        "file packed"
    );
    Ok(package)
}

/// Recover the plaintext from a package produced by [`pack_file`].
///
/// Stages run in order (decode, unwrap, decrypt) and the first failure is
/// returned with no partial output.
///
/// # Errors
///
/// Returns [`EnvelopeError::Framing`](crate::EnvelopeError::Framing) for a
/// malformed package, and either
/// [`EnvelopeError::Unwrap`](crate::EnvelopeError::Unwrap) or
/// [`EnvelopeError::Integrity`](crate::EnvelopeError::Integrity) when the
/// plaintext cannot be recovered.
pub fn unpack_file(package: Bytes, recipient: &PrivateKey) -> EnvelopeResult<Vec<u8>> {
    let package_len = package.len();
    let (wrapped, token) = package::decode(package)?;
    let key = recipient.unwrap(&wrapped)?;
    let plaintext = cipher::decrypt(&key, &token)?;
    debug!(package_len, plaintext_len = plaintext.len(), "file unpacked");
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EnvelopeError, FramingError};
    use crate::keys::fixtures;

    #[test]
    fn hello_world_scenario() {
        let private = fixtures::recipient();
        let package = pack_file(b"hello world", &private.to_public_key()).unwrap();

        let (_, token) = package::decode(package.clone()).unwrap();
        assert_eq!(package.len(), package::LEN_PREFIX + 256 + token.len());
        assert_eq!(&package[..4], &256u32.to_be_bytes());

        assert_eq!(unpack_file(package, &private).unwrap(), b"hello world");
    }

    #[test]
    fn round_trip_various_sizes() {
        let private = fixtures::recipient();
        let public = private.to_public_key();
        for len in [0usize, 1, 15, 16, 17, 1000, 64 * 1024] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let package = pack_file(&plaintext, &public).unwrap();
            assert_eq!(unpack_file(package, &private).unwrap(), plaintext, "len {len}");
        }
    }

    #[test]
    fn identical_inputs_give_distinct_packages() {
        let public = fixtures::recipient().to_public_key();
        let a = pack_file(b"same", &public).unwrap();
        let b = pack_file(b"same", &public).unwrap();
        assert_ne!(a, b);
        assert_ne!(a[4..260], b[4..260]);
        assert_ne!(a[260..], b[260..]);
    }

    #[test]
    fn wrong_private_key_rejected() {
        let package = pack_file(b"for recipient only", &fixtures::recipient().to_public_key())
            .unwrap();
        let err = unpack_file(package, &fixtures::other()).unwrap_err();
        assert!(err.is_decryption_failure());
    }

    #[test]
    fn framing_errors_surface_first() {
        let private = fixtures::recipient();
        assert!(matches!(
            unpack_file(Bytes::from_static(b"\x00\x01"), &private),
            Err(EnvelopeError::Framing(FramingError::TooShort))
        ));
        assert!(matches!(
            unpack_file(Bytes::from_static(b"\x00\x00\x01\x00abc"), &private),
            Err(EnvelopeError::Framing(FramingError::Truncated { .. }))
        ));
    }

    #[test]
    fn tampered_token_rejected() {
        let private = fixtures::recipient();
        let package = pack_file(b"integrity", &private.to_public_key()).unwrap();
        let mut bytes = package.to_vec();
        let last = bytes.len() - 3;
        bytes[last] ^= 0x01;
        assert!(unpack_file(Bytes::from(bytes), &private)
            .unwrap_err()
            .is_decryption_failure());
    }
}
