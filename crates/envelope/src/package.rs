//! Binary framing of a wrapped key and a token into one package.
//!
//! ```text
//! offset 0      4 bytes   big-endian length N of the wrapped key
//! offset 4      N bytes   wrapped key
//! offset 4+N    rest      token
//! ```
//!
//! Decoding only byte-counts the prefix and key region. The token is handed
//! back untouched; its shape is the cipher layer's concern.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::cipher::Token;
use crate::error::FramingError;
use crate::keys::WrappedKey;

/// Byte length of the wrapped-key length prefix.
pub const LEN_PREFIX: usize = 4;

/// Concatenate `wrapped_key` and `token` behind a 4-byte big-endian length prefix.
///
/// # Errors
///
/// Returns [`FramingError::KeyTooLong`] if the wrapped key does not fit the
/// 32-bit prefix.
pub fn encode(wrapped_key: &WrappedKey, token: &Token) -> Result<Bytes, FramingError> {
    let key_len =
        u32::try_from(wrapped_key.len()).map_err(|_| FramingError::KeyTooLong(wrapped_key.len()))?;
    let mut buf = BytesMut::with_capacity(LEN_PREFIX + wrapped_key.len() + token.len());
    buf.put_u32(key_len);
    buf.put_slice(wrapped_key.as_bytes());
    buf.put_slice(token.as_bytes());
    Ok(buf.freeze())
}

/// Split a package into its wrapped key and token without copying.
///
/// # Errors
///
/// Returns [`FramingError::TooShort`] if `package` has fewer than four bytes,
/// and [`FramingError::Truncated`] if fewer bytes follow the prefix than it
/// declares.
pub fn decode(mut package: Bytes) -> Result<(WrappedKey, Token), FramingError> {
    if package.len() < LEN_PREFIX {
        return Err(FramingError::TooShort);
    }
    let declared = package.get_u32() as usize;
    if package.len() < declared {
        return Err(FramingError::Truncated {
            declared,
            available: package.len(),
        });
    }
    let wrapped_key = package.split_to(declared);
    Ok((WrappedKey::from(wrapped_key), Token::from(package)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &[u8], token: &[u8]) -> (WrappedKey, Token) {
        (WrappedKey::from(key.to_vec()), Token::from(token.to_vec()))
    }

    #[test]
    fn encode_layout() {
        let (wk, tok) = pair(&[0xAA; 3], b"tok");
        let pkg = encode(&wk, &tok).unwrap();
        assert_eq!(&pkg[..], &[0, 0, 0, 3, 0xAA, 0xAA, 0xAA, b't', b'o', b'k']);
    }

    #[test]
    fn decode_inverts_encode() {
        for (key, token) in [
            (&[1u8; 256][..], &b"gAAAAA-token"[..]),
            (&[2u8; 1][..], &b""[..]),
            (&[3u8; 512][..], &[0u8; 4096][..]),
        ] {
            let (wk, tok) = pair(key, token);
            let (wk2, tok2) = decode(encode(&wk, &tok).unwrap()).unwrap();
            assert_eq!(wk2, wk);
            assert_eq!(tok2, tok);
        }
    }

    #[test]
    fn too_short_rejected() {
        for len in 0..LEN_PREFIX {
            assert_eq!(
                decode(Bytes::from(vec![0u8; len])).unwrap_err(),
                FramingError::TooShort
            );
        }
    }

    #[test]
    fn truncated_key_region_rejected() {
        let mut pkg = vec![0, 0, 1, 0];
        pkg.extend_from_slice(&[0u8; 255]);
        assert_eq!(
            decode(Bytes::from(pkg)).unwrap_err(),
            FramingError::Truncated {
                declared: 256,
                available: 255
            }
        );
    }

    #[test]
    fn huge_declared_length_does_not_read_out_of_range() {
        let pkg = Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFF, 1, 2, 3]);
        assert!(matches!(
            decode(pkg),
            Err(FramingError::Truncated { declared, available: 3 }) if declared == u32::MAX as usize
        ));
    }

    #[test]
    fn zero_length_key_and_remainder_as_token() {
        let (wk, tok) = decode(Bytes::from_static(&[0, 0, 0, 0, b'x'])).unwrap();
        assert!(wk.is_empty());
        assert_eq!(tok.as_bytes(), b"x");
    }

    #[test]
    fn exact_key_region_yields_empty_token() {
        let (wk, tok) = decode(Bytes::from_static(&[0, 0, 0, 2, 9, 9])).unwrap();
        assert_eq!(wk.as_bytes(), &[9, 9]);
        assert!(tok.is_empty());
    }
}
