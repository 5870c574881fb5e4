//! Stable device identifiers feeding key derivation.

use crate::error::{CryptoError, CryptoResult};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Supplies the stable identifier the at-rest key is derived from.
pub trait DeviceIdSource: Send + Sync {
    fn device_id(&self) -> CryptoResult<String>;
}

/// A fixed identifier (tests, or platforms that supply one directly).
#[derive(Debug, Clone)]
pub struct StaticDeviceId(String);

impl StaticDeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl DeviceIdSource for StaticDeviceId {
    fn device_id(&self) -> CryptoResult<String> {
        if self.0.trim().is_empty() {
            return Err(CryptoError::DeviceId("empty device identifier".to_string()));
        }
        Ok(self.0.clone())
    }
}

/// Device identifier persisted in a file, created on first use.
#[derive(Debug, Clone)]
pub struct FileDeviceId {
    path: PathBuf,
}

impl FileDeviceId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeviceIdSource for FileDeviceId {
    fn device_id(&self) -> CryptoResult<String> {
        load_or_create_device_id(&self.path)
    }
}

/// Loads the device identifier from `path`, or generates and saves a new one.
///
/// Unlike a best-effort cache, a failed write is an error: an identifier
/// that does not survive the process would derive a different key on the
/// next start and strand every local blob.
pub fn load_or_create_device_id(path: &Path) -> CryptoResult<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
            warn!("empty device id file at {}, generating new one", path.display());
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(CryptoError::DeviceId(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            CryptoError::DeviceId(format!("failed to create {}: {e}", parent.display()))
        })?;
    }

    let device_id = Uuid::new_v4().to_string();
    std::fs::write(path, &device_id).map_err(|e| {
        CryptoError::DeviceId(format!("failed to persist device id to {}: {e}", path.display()))
    })?;
    info!("generated new device id at {}", path.display());
    Ok(device_id)
}
