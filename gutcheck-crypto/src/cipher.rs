//! ChaCha20-Poly1305 sealing of byte payloads into single binary blobs.

use crate::error::{CryptoError, CryptoResult};
use crate::key::KeyMaterial;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

/// Nonce size for ChaCha20-Poly1305 (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// Size of a blob sealing an empty payload. Anything shorter is truncated.
pub const MIN_BLOB_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Seals `plaintext` under `key` with a fresh random nonce.
///
/// Returns `nonce || ciphertext || tag`. Empty payloads produce a
/// `MIN_BLOB_SIZE` blob.
pub fn encrypt(plaintext: &[u8], key: &KeyMaterial) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(format!("AEAD seal failed: {e}")))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + sealed.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&sealed);
    Ok(blob)
}

/// Opens a blob produced by [`encrypt`].
///
/// Fails with [`CryptoError::Decryption`] on truncation, tag mismatch, or a
/// different key. Never returns unauthenticated plaintext.
pub fn decrypt(blob: &[u8], key: &KeyMaterial) -> CryptoResult<Vec<u8>> {
    if blob.len() < MIN_BLOB_SIZE {
        return Err(CryptoError::Decryption(format!(
            "blob truncated: {} bytes, need at least {MIN_BLOB_SIZE}",
            blob.len()
        )));
    }

    let (nonce, sealed) = blob.split_at(NONCE_SIZE);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| {
            CryptoError::Decryption("authentication failed (wrong key or tampered data)".to_string())
        })
}
