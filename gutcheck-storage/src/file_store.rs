//! One-file-per-item encrypted store.
//!
//! Writes are staged to a uniquely named hidden `.tmp` file and renamed
//! into place, so a crash mid-write leaves either the previous blob or the
//! new one, never a truncated mix. There is no versioning and no writer serialization: the
//! last completed rename wins.

use crate::error::{StorageError, StorageResult};
use crate::naming::{file_name, parse_file_name, validate_entity_type};
use gutcheck_crypto::EncryptionEngine;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Local encrypted store rooted at a private application directory.
///
/// The directory is created lazily on the first write.
#[derive(Clone)]
pub struct LocalEncryptedStore {
    dir: PathBuf,
    engine: Arc<EncryptionEngine>,
}

impl LocalEncryptedStore {
    pub fn new(dir: impl Into<PathBuf>, engine: Arc<EncryptionEngine>) -> Self {
        Self {
            dir: dir.into(),
            engine,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    pub fn engine(&self) -> &Arc<EncryptionEngine> {
        &self.engine
    }

    /// Encrypts `plaintext` and writes it to `{entity_type}_{id}.encrypted`,
    /// replacing any previous blob.
    pub async fn store(&self, entity_type: &str, id: &str, plaintext: &[u8]) -> StorageResult<()> {
        let name = file_name(entity_type, id)?;
        let blob = self
            .engine
            .encrypt(plaintext)
            .map_err(|source| StorageError::Encryption {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
                source,
            })?;

        self.ensure_dir().await?;

        // Each write stages under its own name so concurrent writers of the
        // same item never share a file; the last rename wins.
        let path = self.dir.join(&name);
        let staging = self.dir.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = write_file(&staging, &blob).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(StorageError::Io { path, source: e });
        }

        debug!("stored {entity_type}/{id} ({} bytes sealed)", blob.len());
        Ok(())
    }

    /// Reads and decrypts an item. Absence is `Ok(None)`.
    ///
    /// A blob that exists but fails to decrypt is an error, so corruption
    /// or a key change is never mistaken for a missing record.
    pub async fn retrieve(&self, entity_type: &str, id: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.dir.join(file_name(entity_type, id)?);
        let blob = match tokio::fs::read(&path).await {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io { path, source: e }),
        };

        let plaintext = self
            .engine
            .decrypt(&blob)
            .map_err(|source| StorageError::Decryption {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
                source,
            })?;
        Ok(Some(plaintext))
    }

    pub async fn exists(&self, entity_type: &str, id: &str) -> StorageResult<bool> {
        let path = self.dir.join(file_name(entity_type, id)?);
        tokio::fs::try_exists(&path)
            .await
            .map_err(StorageError::io(&path))
    }

    /// Removes an item. Deleting an absent item is a no-op.
    pub async fn delete(&self, entity_type: &str, id: &str) -> StorageResult<()> {
        let path = self.dir.join(file_name(entity_type, id)?);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("deleted {entity_type}/{id}");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }

    /// Entity types with at least one stored item, sorted.
    pub async fn list_types(&self) -> StorageResult<Vec<String>> {
        let types: BTreeSet<String> = self
            .scan()
            .await?
            .into_iter()
            .map(|(entity_type, _)| entity_type)
            .collect();
        Ok(types.into_iter().collect())
    }

    /// Ids stored for `entity_type`, sorted.
    pub async fn list_ids(&self, entity_type: &str) -> StorageResult<Vec<String>> {
        validate_entity_type(entity_type)?;
        let mut ids: Vec<String> = self
            .scan()
            .await?
            .into_iter()
            .filter(|(t, _)| t == entity_type)
            .map(|(_, id)| id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Decrypts every item of `entity_type`, in id order.
    ///
    /// Fails on the first blob that cannot be decrypted. An item deleted
    /// between listing and reading is skipped.
    pub async fn retrieve_all(&self, entity_type: &str) -> StorageResult<Vec<(String, Vec<u8>)>> {
        let ids = self.list_ids(entity_type).await?;
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(plaintext) = self.retrieve(entity_type, &id).await? {
                items.push((id, plaintext));
            }
        }
        Ok(items)
    }

    /// Deletes every stored blob (account wipe, key-corruption recovery).
    ///
    /// Staging leftovers are removed too. Returns the number of items deleted.
    pub async fn clear_all(&self) -> StorageResult<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.dir.clone(),
                    source: e,
                });
            }
        };

        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(StorageError::io(&self.dir))?
        {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let is_blob = parse_file_name(name).is_some();
            let is_staging = name.starts_with('.') && name.ends_with(".tmp");
            if !is_blob && !is_staging {
                continue;
            }

            let path = entry.path();
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    if is_blob {
                        removed += 1;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StorageError::Io { path, source: e }),
            }
        }

        info!("cleared local store at {} ({removed} items)", self.dir.display());
        Ok(removed)
    }

    /// Parses every blob file name in the directory.
    async fn scan(&self) -> StorageResult<Vec<(String, String)>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.dir.clone(),
                    source: e,
                });
            }
        };

        let mut found = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(StorageError::io(&self.dir))?
        {
            let file_name = entry.file_name();
            match file_name.to_str().and_then(parse_file_name) {
                Some((entity_type, id)) => found.push((entity_type.to_string(), id.to_string())),
                None => debug!("ignoring foreign file {:?}", entry.path()),
            }
        }
        Ok(found)
    }

    async fn ensure_dir(&self) -> StorageResult<()> {
        if tokio::fs::try_exists(&self.dir)
            .await
            .map_err(StorageError::io(&self.dir))?
        {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(StorageError::io(&self.dir))?;
        restrict_dir_permissions(&self.dir).await;
        info!("created local store directory {}", self.dir.display());
        Ok(())
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await.map_err(StorageError::io(path))?;
    file.write_all(bytes).await.map_err(StorageError::io(path))?;
    file.sync_all().await.map_err(StorageError::io(path))?;
    Ok(())
}

async fn restrict_dir_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700)).await {
            warn!("cannot restrict permissions on {}: {e}", path.display());
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}
