//! Errors surfaced to callers of the persistence layer.

use gutcheck_cloud::CloudError;
use gutcheck_crypto::CryptoError;
use gutcheck_storage::StorageError;
use thiserror::Error;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Absence is never an error here; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to encrypt {entity_type}/{id}: {source}")]
    EncryptionFailure {
        entity_type: String,
        id: String,
        #[source]
        source: CryptoError,
    },

    /// Corruption or a key that no longer matches the blob.
    #[error("failed to decrypt {entity_type}/{id}: {source}")]
    DecryptionFailure {
        entity_type: String,
        id: String,
        #[source]
        source: CryptoError,
    },

    #[error("local storage failure: {0}")]
    StorageFailure(#[source] StorageError),

    #[error("remote operation failed: {0}")]
    CloudOperationFailure(#[source] CloudError),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("authentication required")]
    NotAuthenticated,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("key derivation failed: {0}")]
    KeyDerivation(#[from] CryptoError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<StorageError> for PersistenceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Encryption {
                entity_type,
                id,
                source,
            } => Self::EncryptionFailure {
                entity_type,
                id,
                source,
            },
            StorageError::Decryption {
                entity_type,
                id,
                source,
            } => Self::DecryptionFailure {
                entity_type,
                id,
                source,
            },
            other => Self::StorageFailure(other),
        }
    }
}

impl From<CloudError> for PersistenceError {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::NotAuthenticated => Self::NotAuthenticated,
            CloudError::PermissionDenied(detail) => Self::PermissionDenied(detail),
            CloudError::Config(detail) => Self::Config(detail),
            other => Self::CloudOperationFailure(other),
        }
    }
}
