//! Encryption-at-rest engine for GutCheck.
//!
//! Provides device-bound encryption using:
//! - SHA-256 key derivation from a stable device identifier and a fixed
//!   application salt
//! - ChaCha20-Poly1305 for authenticated encryption
//! - Zeroization of key material on drop
//!
//! # Key lifecycle
//!
//! Key material is never persisted or transmitted. It is re-derived on every
//! process start from the device identifier, so each device holds an
//! independently encrypted copy of its local data. Re-deriving after the
//! identifier changes invalidates every existing ciphertext; callers wipe the
//! local store first (see the persistence crate's recovery path).
//!
//! # Blob format
//!
//! ```text
//! [ nonce (12 bytes) | ciphertext | Poly1305 tag (16 bytes) ]
//! ```

mod cipher;
pub mod device;
mod engine;
mod error;
mod key;

pub use cipher::{decrypt, encrypt, MIN_BLOB_SIZE, NONCE_SIZE, TAG_SIZE};
pub use device::{load_or_create_device_id, DeviceIdSource, FileDeviceId, StaticDeviceId};
pub use engine::EncryptionEngine;
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, KeyMaterial, APP_SALT, KEY_SIZE};
