//! RSA-OAEP wrapping of symmetric keys.
//!
//! Padding is OAEP with SHA-256 for both the hash and MGF1, empty label. The
//! two key types are capability-restricted: [`PublicKey`] can only wrap and
//! [`PrivateKey`] can only unwrap.
//!
//! Every unwrap failure collapses to [`EnvelopeError::Unwrap`], whatever the
//! cause (length mismatch, wrong key, corrupted bytes, bad padding).

use std::io::BufReader;

use bytes::Bytes;
use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use rustls_pemfile::Item;
use sha2::Sha256;
use x509_cert::der::{Decode, Encode};
use x509_cert::Certificate;
use zeroize::Zeroizing;

use crate::cipher::{SymmetricKey, KEY_LEN, KEY_TEXT_LEN};
use crate::error::{EnvelopeError, EnvelopeResult};

/// Output length of SHA-256, the OAEP hash.
const OAEP_HASH_LEN: usize = 32;

/// Largest message OAEP-SHA256 can carry under a modulus of `modulus_len` bytes.
pub fn max_wrappable_len(modulus_len: usize) -> usize {
    modulus_len.saturating_sub(2 * OAEP_HASH_LEN + 2)
}

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// RSA-OAEP ciphertext of a [`SymmetricKey`]; as long as the recipient modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKey(Bytes);

impl WrappedKey {
    /// Borrow the ciphertext bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Ciphertext length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a zero-length wrapped key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the wrapped key, returning the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for WrappedKey {
    fn from(b: Bytes) -> Self {
        Self(b)
    }
}

impl From<Vec<u8>> for WrappedKey {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}

/// Recipient public key. Wrap-only.
#[derive(Debug, Clone)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

impl PublicKey {
    /// Wrap an already-parsed RSA public key.
    pub fn from_rsa(inner: RsaPublicKey) -> Self {
        Self { inner }
    }

    /// Extract the RSA public key from the first certificate in a PEM bundle.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidKey`] if no certificate is present, the
    /// certificate cannot be decoded, or its subject key is not RSA.
    pub fn from_certificate_pem(pem: &[u8]) -> EnvelopeResult<Self> {
        let der = rustls_pemfile::certs(&mut BufReader::new(pem))
            .next()
            .ok_or_else(|| EnvelopeError::InvalidKey("no certificate found in PEM data".into()))?
            .map_err(|e| EnvelopeError::InvalidKey(format!("unreadable certificate PEM: {e}")))?;

        let cert = Certificate::from_der(der.as_ref())
            .map_err(|e| EnvelopeError::InvalidKey(format!("malformed certificate: {e}")))?;
        let spki = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| EnvelopeError::InvalidKey(format!("malformed subject key: {e}")))?;
        let inner = RsaPublicKey::from_public_key_der(&spki)
            .map_err(|e| EnvelopeError::InvalidKey(format!("certificate key is not RSA: {e}")))?;

        Ok(Self::from_rsa(inner))
    }

    /// Modulus size in bytes; also the length of every [`WrappedKey`] it produces.
    pub fn modulus_len(&self) -> usize {
        self.inner.size()
    }

    /// Wrap the 32 raw bytes of `key` with RSA-OAEP-SHA256.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Wrap`] if the modulus is too small to carry the
    /// key under OAEP-SHA256, or if the RSA operation fails.
    pub fn wrap(&self, key: &SymmetricKey) -> EnvelopeResult<WrappedKey> {
        if KEY_LEN > max_wrappable_len(self.modulus_len()) {
            return Err(EnvelopeError::Wrap);
        }
        let raw = key.to_bytes();
        let wrapped = self
            .inner
            .encrypt(&mut OsRng, oaep(), &raw[..])
            .map_err(|_| EnvelopeError::Wrap)?;
        Ok(WrappedKey::from(wrapped))
    }
}

/// Recipient private key. Unwrap-only.
#[derive(Clone)]
pub struct PrivateKey {
    inner: RsaPrivateKey,
}

impl PrivateKey {
    /// Wrap an already-parsed RSA private key.
    pub fn from_rsa(inner: RsaPrivateKey) -> Self {
        Self { inner }
    }

    /// Parse the first unencrypted RSA private key in PEM data.
    ///
    /// Accepts PKCS#1 (`RSA PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) blocks.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidKey`] if no RSA private key is present
    /// or the key cannot be decoded.
    pub fn from_pem(pem: &[u8]) -> EnvelopeResult<Self> {
        for item in rustls_pemfile::read_all(&mut BufReader::new(pem)) {
            let item = item
                .map_err(|e| EnvelopeError::InvalidKey(format!("unreadable key PEM: {e}")))?;
            let parsed = match item {
                Item::Pkcs1Key(k) => {
                    RsaPrivateKey::from_pkcs1_der(k.secret_pkcs1_der()).map_err(|e| e.to_string())
                }
                Item::Pkcs8Key(k) => {
                    RsaPrivateKey::from_pkcs8_der(k.secret_pkcs8_der()).map_err(|e| e.to_string())
                }
                Item::Sec1Key(_) => {
                    return Err(EnvelopeError::InvalidKey(
                        "only RSA private keys are supported".into(),
                    ))
                }
                _ => continue,
            };
            return parsed
                .map(Self::from_rsa)
                .map_err(|e| EnvelopeError::InvalidKey(format!("malformed RSA private key: {e}")));
        }
        Err(EnvelopeError::InvalidKey(
            "no private key found in PEM data".into(),
        ))
    }

    /// The public half, for producing packages this key can open.
    pub fn to_public_key(&self) -> PublicKey {
        PublicKey::from_rsa(self.inner.to_public_key())
    }

    /// Modulus size in bytes; every acceptable [`WrappedKey`] has this length.
    pub fn modulus_len(&self) -> usize {
        self.inner.size()
    }

    /// Recover the symmetric key from `wrapped`.
    ///
    /// The recovered secret is normally the 32 raw key bytes. The 44-byte
    /// base64url text form written by Fernet-based senders is also accepted.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Unwrap`] for every failure.
    pub fn unwrap(&self, wrapped: &WrappedKey) -> EnvelopeResult<SymmetricKey> {
        if wrapped.len() != self.modulus_len() {
            return Err(EnvelopeError::Unwrap);
        }
        let secret = Zeroizing::new(
            self.inner
                .decrypt_blinded(&mut OsRng, oaep(), wrapped.as_bytes())
                .map_err(|_| EnvelopeError::Unwrap)?,
        );
        let key = match secret.len() {
            KEY_LEN => SymmetricKey::from_slice(&secret),
            KEY_TEXT_LEN => SymmetricKey::from_base64(&secret),
            _ => Err(EnvelopeError::Unwrap),
        };
        key.map_err(|_| EnvelopeError::Unwrap)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("modulus_len", &self.modulus_len())
            .finish_non_exhaustive()
    }
}
