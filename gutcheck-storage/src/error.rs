//! Local store error types.

use gutcheck_crypto::CryptoError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for local store operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encrypt {entity_type}/{id}: {source}")]
    Encryption {
        entity_type: String,
        id: String,
        #[source]
        source: CryptoError,
    },

    /// The blob exists but cannot be opened. Never reported as absence.
    #[error("failed to decrypt {entity_type}/{id}: {source}")]
    Decryption {
        entity_type: String,
        id: String,
        #[source]
        source: CryptoError,
    },

    #[error("invalid storage name: {0}")]
    InvalidName(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
