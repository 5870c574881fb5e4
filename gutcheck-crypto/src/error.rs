//! Encryption error types.

use thiserror::Error;

/// Result type for encryption operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Tag mismatch, truncation, or a key that did not seal this blob.
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("encryption key unavailable")]
    KeyUnavailable,

    #[error("device identifier unavailable: {0}")]
    DeviceId(String),
}
