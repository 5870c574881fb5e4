//! Local encrypted store for GutCheck.
//!
//! Device-local items are written as one ciphertext blob per item under a
//! private application directory:
//!
//! ```text
//! {data_dir}/{entity_type}_{id}.encrypted
//! ```
//!
//! The naming convention is the on-disk format; backup and diagnostic
//! tooling parse it the same way [`naming::parse_file_name`] does. Each
//! device encrypts with its own key, so the directory is never portable
//! between devices.

mod error;
mod file_store;
pub mod naming;

pub use error::{StorageError, StorageResult};
pub use file_store::LocalEncryptedStore;
