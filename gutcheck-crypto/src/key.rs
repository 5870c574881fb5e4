//! Device-bound key material.

use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key size in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Fixed application salt mixed into every derivation.
pub const APP_SALT: &[u8] = b"gutcheck.local-store.v1";

/// Separates this derivation from any other SHA-256 use of the same inputs.
const DOMAIN_TAG: &[u8] = b"gutcheck/at-rest-key";

/// 256-bit symmetric key. Held in memory only; zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_SIZE],
}

impl KeyMaterial {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Short non-secret identifier for logs: the first 4 bytes of
    /// SHA-256(key), hex encoded.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.bytes);
        hex::encode(&digest[..4])
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial({})", self.fingerprint())
    }
}

/// Derives the at-rest key from a device identifier and salt.
///
/// Deterministic: the same inputs always produce the same key. Inputs are
/// length-prefixed so `("ab", "c")` and `("a", "bc")` cannot collide.
pub fn derive_key(device_id: &str, salt: &[u8]) -> KeyMaterial {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    hasher.update((salt.len() as u64).to_be_bytes());
    hasher.update(salt);
    hasher.update((device_id.len() as u64).to_be_bytes());
    hasher.update(device_id.as_bytes());

    let mut digest = hasher.finalize();
    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();

    KeyMaterial { bytes }
}
