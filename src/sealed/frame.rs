use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use super::error::{CryptoError, FramingError};

/// Fixed header every sealed result starts with.
pub const SEALED_HEADER: [u8; 4] = [0x9E, 0x85, 0xDC, 0xED];

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Smallest possible sealed result: header, nonce and tag with no ciphertext.
pub const MIN_SEALED_LEN: usize = SEALED_HEADER.len() + NONCE_LEN + TAG_LEN;

/// A sealed result split into its framed parts.
///
/// Holds no plaintext; nothing in here is trusted until [`super::unseal`]
/// has verified the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedFrame {
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
    tag: [u8; TAG_LEN],
}

impl SealedFrame {
    /// Decode a base64 sealed result and split it.
    pub fn parse(sealed_base64: &str) -> Result<Self, FramingError> {
        let bytes = BASE64
            .decode(sealed_base64.trim())
            .map_err(|e| FramingError::InvalidBase64(e.to_string()))?;

        Self::from_bytes(&bytes)
    }

    /// Split raw sealed bytes.
    ///
    /// The length check runs first, so any buffer shorter than
    /// [`MIN_SEALED_LEN`] is `TooShort` whatever its content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FramingError> {
        let len = bytes.len();
        if len < MIN_SEALED_LEN {
            return Err(FramingError::TooShort {
                len,
                min: MIN_SEALED_LEN,
            });
        }

        let header = &bytes[..SEALED_HEADER.len()];
        if header != SEALED_HEADER {
            return Err(FramingError::BadMagic {
                found: hex_upper(header),
            });
        }

        let body_start = SEALED_HEADER.len() + NONCE_LEN;
        let tag_start = len - TAG_LEN;

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[SEALED_HEADER.len()..body_start]);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[tag_start..]);

        Ok(SealedFrame {
            nonce,
            ciphertext: bytes[body_start..tag_start].to_vec(),
            tag,
        })
    }

    /// Build a frame from separately held parts.
    pub fn from_parts(nonce: &[u8], ciphertext: Vec<u8>, tag: &[u8]) -> Result<Self, CryptoError> {
        let nonce: [u8; NONCE_LEN] =
            nonce
                .try_into()
                .map_err(|_| CryptoError::InvalidNonceLength {
                    expected: NONCE_LEN,
                    actual: nonce.len(),
                })?;
        let tag: [u8; TAG_LEN] = tag.try_into().map_err(|_| CryptoError::InvalidTagLength {
            expected: TAG_LEN,
            actual: tag.len(),
        })?;

        Ok(SealedFrame {
            nonce,
            ciphertext,
            tag,
        })
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    /// Reassemble the wire bytes (header, nonce, ciphertext, tag).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_SEALED_LEN + self.ciphertext.len());
        out.extend_from_slice(&SEALED_HEADER);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }
}

fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
