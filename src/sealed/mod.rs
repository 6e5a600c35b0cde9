//! Sealed result unsealing.
//!
//! A sealed result is `magic(4) ‖ nonce(12) ‖ ciphertext ‖ tag(16)`, base64
//! encoded. The ciphertext is AES-256-GCM over a raw DEFLATE stream of UTF-8
//! JSON.

pub mod cipher;
pub mod error;
pub mod frame;
pub mod inflate;

pub use cipher::{seal, unseal, SecretKey};
pub use error::{CryptoError, DecompressError, FramingError};
pub use frame::SealedFrame;
pub use inflate::{deflate, inflate, DEFAULT_MAX_INFLATED_BYTES};
