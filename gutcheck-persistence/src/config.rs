//! Persistence layer configuration.

use crate::error::{PersistenceError, PersistenceResult};
use gutcheck_cloud::{CloudConfig, ReachabilityConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything needed to wire a [`PersistenceContext`](crate::PersistenceContext).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Application-private data directory. Encrypted blobs live in
    /// `{data_dir}/encrypted`.
    pub data_dir: PathBuf,

    /// File holding the stable device identifier the at-rest key is derived
    /// from. Defaults to `{data_dir}/device_id`.
    pub device_id_file: Option<PathBuf>,

    pub cloud: CloudConfig,

    pub reachability: ReachabilityConfig,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("gutcheck-data"),
            device_id_file: None,
            cloud: CloudConfig::default(),
            reachability: ReachabilityConfig::default(),
        }
    }
}

impl PersistenceConfig {
    /// A default config rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PersistenceError::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| PersistenceError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    pub fn local_store_dir(&self) -> PathBuf {
        self.data_dir.join("encrypted")
    }

    pub fn device_id_path(&self) -> PathBuf {
        self.device_id_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("device_id"))
    }
}
