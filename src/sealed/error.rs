use thiserror::Error;

/// Errors raised while splitting a sealed result into its parts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("Sealed result is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("Sealed result too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    #[error("Wrong sealed header: {found}")]
    BadMagic { found: String },
}

/// Errors raised by the AEAD layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("Invalid tag length: expected {expected}, got {actual}")]
    InvalidTagLength { expected: usize, actual: usize },

    #[error("Key is not valid base64")]
    InvalidKeyEncoding,

    #[error("Authentication tag mismatch")]
    AuthenticationFailed,

    #[error("Encryption failed")]
    EncryptionFailed,
}

/// Errors raised while inflating the decrypted payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    #[error("Corrupt deflate stream: {0}")]
    Corrupt(String),

    #[error("Inflated payload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Inflated payload is not UTF-8: {0}")]
    InvalidUtf8(String),
}
