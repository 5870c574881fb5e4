//! The encryption engine: current key material plus seal/open.

use crate::cipher;
use crate::device::DeviceIdSource;
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, KeyMaterial, APP_SALT};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Holds the device-bound key and performs authenticated encrypt/decrypt.
///
/// The key is immutable once derived; operations clone the `Arc` out of the
/// lock and run the cipher without holding it, so concurrent callers never
/// contend beyond the pointer copy. Only [`regenerate_key`](Self::regenerate_key)
/// swaps it.
pub struct EncryptionEngine {
    source: Arc<dyn DeviceIdSource>,
    salt: Vec<u8>,
    key: RwLock<Option<Arc<KeyMaterial>>>,
}

impl EncryptionEngine {
    /// Creates an engine and derives the key with [`APP_SALT`].
    pub fn new(source: Arc<dyn DeviceIdSource>) -> CryptoResult<Self> {
        Self::with_salt(source, APP_SALT)
    }

    /// Creates an engine with a caller-provided salt.
    pub fn with_salt(source: Arc<dyn DeviceIdSource>, salt: &[u8]) -> CryptoResult<Self> {
        let engine = Self::locked_with_salt(source, salt);
        engine.regenerate_key()?;
        Ok(engine)
    }

    /// Creates an engine with no key yet. Encryption fails with
    /// [`CryptoError::KeyUnavailable`] until [`regenerate_key`](Self::regenerate_key)
    /// succeeds.
    pub fn locked(source: Arc<dyn DeviceIdSource>) -> Self {
        Self::locked_with_salt(source, APP_SALT)
    }

    fn locked_with_salt(source: Arc<dyn DeviceIdSource>, salt: &[u8]) -> Self {
        Self {
            source,
            salt: salt.to_vec(),
            key: RwLock::new(None),
        }
    }

    pub fn has_key(&self) -> bool {
        self.read_key().is_some()
    }

    /// Non-secret fingerprint of the current key, for diagnostics.
    pub fn key_fingerprint(&self) -> Option<String> {
        self.read_key().as_ref().map(|k| k.fingerprint())
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = self.current_key()?;
        cipher::encrypt(plaintext, &key)
    }

    pub fn decrypt(&self, blob: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = self.current_key()?;
        cipher::decrypt(blob, &key)
    }

    /// Re-reads the device identifier and re-derives the key.
    ///
    /// Returns `true` if the key changed. When it does, every blob sealed
    /// under the previous key is unreadable; wipe them before calling this.
    pub fn regenerate_key(&self) -> CryptoResult<bool> {
        let device_id = self.source.device_id()?;
        let derived = Arc::new(derive_key(&device_id, &self.salt));

        let mut slot = self.write_key();
        let changed = slot
            .as_ref()
            .is_none_or(|current| current.as_bytes() != derived.as_bytes());

        if changed && slot.is_some() {
            warn!(
                "at-rest key changed ({} -> {}); existing ciphertexts are now unreadable",
                slot.as_ref().map(|k| k.fingerprint()).unwrap_or_default(),
                derived.fingerprint()
            );
        } else {
            debug!("derived at-rest key {}", derived.fingerprint());
        }

        *slot = Some(derived);
        Ok(changed)
    }

    fn current_key(&self) -> CryptoResult<Arc<KeyMaterial>> {
        self.read_key().clone().ok_or(CryptoError::KeyUnavailable)
    }

    // A panic while holding the lock cannot leave the key half-written,
    // so poisoned guards are safe to recover.
    fn read_key(&self) -> RwLockReadGuard<'_, Option<Arc<KeyMaterial>>> {
        self.key.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_key(&self) -> RwLockWriteGuard<'_, Option<Arc<KeyMaterial>>> {
        self.key.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
