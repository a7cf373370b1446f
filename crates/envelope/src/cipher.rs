//! Authenticated encryption of whole files into Fernet-compatible tokens.
//!
//! **Algorithm:** AES-128-CBC with PKCS#7 padding under the encryption half of
//! a fresh 32-byte key, authenticated with HMAC-SHA256 under the signing half.
//! The MAC is verified in constant time before any decryption is attempted.
//!
//! # Token format
//!
//! ```text
//! version(1) ‖ timestamp(8, BE) ‖ iv(16) ‖ ciphertext(16·n) ‖ hmac(32)
//! ```
//!
//! The whole token is base64url-encoded with padding. The timestamp is written
//! for format compatibility but never checked: tokens do not expire.

use std::time::{SystemTime, UNIX_EPOCH};

use aes::Aes128;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use bytes::Bytes;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, Iv, Key, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{EnvelopeError, EnvelopeResult};

type HmacSha256 = Hmac<Sha256>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Byte length of a [`SymmetricKey`].
pub const KEY_LEN: usize = 32;

/// Byte length of each key half (signing, encryption).
pub const HALF_KEY_LEN: usize = KEY_LEN / 2;

/// Byte length of the textual (base64url, padded) form of a key.
pub const KEY_TEXT_LEN: usize = 44;

/// Leading version byte of every token.
pub const VERSION: u8 = 0x80;

/// Byte length of the big-endian Unix timestamp field.
pub const TIMESTAMP_LEN: usize = 8;

/// Byte length of the CBC initialisation vector.
pub const IV_LEN: usize = 16;

/// AES block size.
pub const BLOCK_LEN: usize = 16;

/// Byte length of the trailing HMAC-SHA256 tag.
pub const MAC_LEN: usize = 32;

const HEADER_LEN: usize = 1 + TIMESTAMP_LEN + IV_LEN;

/// Smallest decoded token: PKCS#7 always emits at least one block.
pub const MIN_TOKEN_LEN: usize = HEADER_LEN + BLOCK_LEN + MAC_LEN;

/// A 32-byte symmetric key: signing half followed by encryption half.
///
/// Zeroed on drop and never cloned. Exists only for the duration of one
/// encrypt or decrypt call.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    signing: [u8; HALF_KEY_LEN],
    encryption: [u8; HALF_KEY_LEN],
}

impl SymmetricKey {
    /// Draw a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut key = Self {
            signing: [0u8; HALF_KEY_LEN],
            encryption: [0u8; HALF_KEY_LEN],
        };
        OsRng.fill_bytes(&mut key.signing);
        OsRng.fill_bytes(&mut key.encryption);
        key
    }

    /// Build a key from exactly [`KEY_LEN`] raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidKey`] if `bytes` has the wrong length.
    pub fn from_slice(bytes: &[u8]) -> EnvelopeResult<Self> {
        if bytes.len() != KEY_LEN {
            return Err(EnvelopeError::InvalidKey(format!(
                "symmetric key must be {KEY_LEN} bytes"
            )));
        }
        let mut key = Self {
            signing: [0u8; HALF_KEY_LEN],
            encryption: [0u8; HALF_KEY_LEN],
        };
        key.signing.copy_from_slice(&bytes[..HALF_KEY_LEN]);
        key.encryption.copy_from_slice(&bytes[HALF_KEY_LEN..]);
        Ok(key)
    }

    /// Parse the padded base64url text form used by Fernet libraries.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidKey`] if the text is not valid base64url
    /// or does not decode to [`KEY_LEN`] bytes.
    pub fn from_base64(text: &[u8]) -> EnvelopeResult<Self> {
        let raw = Zeroizing::new(
            URL_SAFE
                .decode(text)
                .map_err(|_| EnvelopeError::InvalidKey("symmetric key is not base64url".into()))?,
        );
        Self::from_slice(&raw)
    }

    /// Encode the key in the padded base64url text form used by Fernet libraries.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(URL_SAFE.encode(&*self.to_bytes()))
    }

    /// Copy the raw key bytes into a buffer that is zeroed on drop.
    pub fn to_bytes(&self) -> Zeroizing<[u8; KEY_LEN]> {
        let mut out = Zeroizing::new([0u8; KEY_LEN]);
        out[..HALF_KEY_LEN].copy_from_slice(&self.signing);
        out[HALF_KEY_LEN..].copy_from_slice(&self.encryption);
        out
    }

    /// HMAC key: bytes `0..16`.
    pub fn signing_half(&self) -> &[u8; HALF_KEY_LEN] {
        &self.signing
    }

    /// AES key: bytes `16..32`.
    pub fn encryption_half(&self) -> &[u8; HALF_KEY_LEN] {
        &self.encryption
    }

    fn mac(&self) -> EnvelopeResult<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(&self.signing)
            .map_err(|_| EnvelopeError::InvalidKey("HMAC signing key rejected".into()))
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Base64url text of an encrypted, authenticated payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(Bytes);

impl Token {
    /// Borrow the token's text bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the encoded token in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a zero-length token (never produced by [`encrypt`]).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the token, returning the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for Token {
    fn from(b: Bytes) -> Self {
        Self(b)
    }
}

impl From<Vec<u8>> for Token {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}

/// Fields of a decoded token, borrowed from the decoded buffer.
struct TokenParts<'a> {
    iv: &'a [u8],
    ciphertext: &'a [u8],
    /// `version ‖ timestamp ‖ iv ‖ ciphertext`: the MAC input.
    signed: &'a [u8],
    mac: &'a [u8],
}

impl<'a> TokenParts<'a> {
    fn parse(raw: &'a [u8]) -> EnvelopeResult<Self> {
        if raw.len() < MIN_TOKEN_LEN || raw[0] != VERSION {
            return Err(EnvelopeError::Integrity);
        }
        let (signed, mac) = raw.split_at(raw.len() - MAC_LEN);
        let iv = &signed[1 + TIMESTAMP_LEN..HEADER_LEN];
        let ciphertext = &signed[HEADER_LEN..];
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(EnvelopeError::Integrity);
        }
        Ok(Self {
            iv,
            ciphertext,
            signed,
            mac,
        })
    }
}

/// Encrypt `plaintext` under a freshly generated key.
///
/// Returns the raw key (not yet wrapped) and the token.
///
/// # Errors
///
/// Returns [`EnvelopeError::InvalidKey`] only if the HMAC implementation
/// rejects the signing key, which cannot happen for a 16-byte key.
pub fn encrypt(plaintext: &[u8]) -> EnvelopeResult<(SymmetricKey, Token)> {
    let key = SymmetricKey::generate();
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    let token = encrypt_with(&key, plaintext, &iv, unix_now())?;
    Ok((key, token))
}

/// Deterministic core of [`encrypt`]: caller supplies key, IV and timestamp.
fn encrypt_with(
    key: &SymmetricKey,
    plaintext: &[u8],
    iv: &[u8; IV_LEN],
    timestamp: u64,
) -> EnvelopeResult<Token> {
    let ciphertext = Aes128CbcEnc::new(
        Key::<Aes128CbcEnc>::from_slice(key.encryption_half()),
        Iv::<Aes128CbcEnc>::from_slice(iv),
    )
    .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut raw = Vec::with_capacity(HEADER_LEN + ciphertext.len() + MAC_LEN);
    raw.push(VERSION);
    raw.extend_from_slice(&timestamp.to_be_bytes());
    raw.extend_from_slice(iv);
    raw.extend_from_slice(&ciphertext);

    let mut mac = key.mac()?;
    mac.update(&raw);
    raw.extend_from_slice(&mac.finalize().into_bytes());

    Ok(Token::from(URL_SAFE.encode(&raw).into_bytes()))
}

/// Verify and decrypt `token` with `key`.
///
/// # Errors
///
/// Returns [`EnvelopeError::Integrity`] for bad base64, a short or misaligned
/// token, an unknown version byte, a MAC mismatch, or bad padding.
pub fn decrypt(key: &SymmetricKey, token: &Token) -> EnvelopeResult<Vec<u8>> {
    let raw = URL_SAFE
        .decode(token.as_bytes())
        .map_err(|_| EnvelopeError::Integrity)?;
    let parts = TokenParts::parse(&raw)?;

    let mut mac = key.mac()?;
    mac.update(parts.signed);
    mac.verify_slice(parts.mac)
        .map_err(|_| EnvelopeError::Integrity)?;

    Aes128CbcDec::new(
        Key::<Aes128CbcDec>::from_slice(key.encryption_half()),
        Iv::<Aes128CbcDec>::from_slice(parts.iv),
    )
    .decrypt_padded_vec_mut::<Pkcs7>(parts.ciphertext)
    .map_err(|_| EnvelopeError::Integrity)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
