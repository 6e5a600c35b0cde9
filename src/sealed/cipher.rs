//! AES-256-GCM layer of the sealed result.
//!
//! Tag comparison is constant time inside `aes-gcm`; plaintext is only
//! returned after the tag has been verified.

use std::fmt;

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::Aes256Gcm;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::CryptoError;
use super::frame::{SealedFrame, NONCE_LEN};

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// Process-wide decryption key (256-bit).
///
/// Wiped from memory on drop. `Debug` never prints the bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        SecretKey(bytes)
    }

    /// Create from a slice, rejecting anything that is not 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            })?;
        Ok(SecretKey(key))
    }

    /// Decode a base64 key as handed out by the vendor dashboard.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let mut decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| CryptoError::InvalidKeyEncoding)?;
        let key = Self::from_slice(&decoded);
        decoded.zeroize();
        key
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Decrypt and authenticate a sealed frame.
///
/// No associated data is bound. Any tag mismatch (wrong key, flipped bit in
/// ciphertext or tag, wrong nonce) is `AuthenticationFailed`.
pub fn unseal(frame: &SealedFrame, key: &SecretKey) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));

    let mut buffer = frame.ciphertext().to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(frame.nonce()),
            b"",
            &mut buffer,
            GenericArray::from_slice(frame.tag()),
        )
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(buffer)
}

/// Encrypt `plaintext` into a sealed frame.
///
/// Nonce uniqueness per key is the caller's responsibility.
pub fn seal(plaintext: &[u8], key: &SecretKey, nonce: &[u8]) -> Result<SealedFrame, CryptoError> {
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_LEN,
            actual: nonce.len(),
        });
    }

    let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), b"", &mut buffer)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    SealedFrame::from_parts(nonce, buffer, tag.as_slice())
}
