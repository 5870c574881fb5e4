//! Composition root.
//!
//! One [`PersistenceContext`] per process owns the engine, both stores, the
//! session and the reachability monitor, and hands out the router. Nothing
//! here is global; tests build as many contexts as they like.

use crate::config::PersistenceConfig;
use crate::error::PersistenceResult;
use crate::router::PrivacyRouter;
use gutcheck_cloud::{
    DocumentStore, HttpDocumentStore, ProbeHandle, ReachabilityMonitor, RemoteStoreAdapter, Session,
};
use gutcheck_crypto::{DeviceIdSource, EncryptionEngine, FileDeviceId};
use gutcheck_storage::LocalEncryptedStore;
use std::sync::Arc;
use tracing::{info, warn};

pub struct PersistenceContext {
    config: PersistenceConfig,
    engine: Arc<EncryptionEngine>,
    session: Session,
    reachability: ReachabilityMonitor,
    router: PrivacyRouter,
    probe: Option<ProbeHandle>,
}

impl PersistenceContext {
    /// Wires the production stack: file-backed device id and the HTTP
    /// document store.
    pub fn new(config: PersistenceConfig) -> PersistenceResult<Self> {
        let session = Session::new();
        let device_id = Arc::new(FileDeviceId::new(config.device_id_path()));
        let store = Arc::new(HttpDocumentStore::new(&config.cloud, session.clone())?);
        Self::with_parts(config, device_id, store, session)
    }

    /// Wires the stack around a caller-supplied device id source and
    /// document store.
    pub fn with_parts(
        config: PersistenceConfig,
        device_id: Arc<dyn DeviceIdSource>,
        store: Arc<dyn DocumentStore>,
        session: Session,
    ) -> PersistenceResult<Self> {
        let engine = Arc::new(EncryptionEngine::new(device_id)?);
        let local = LocalEncryptedStore::new(config.local_store_dir(), engine.clone());
        let reachability = ReachabilityMonitor::new();
        let remote = RemoteStoreAdapter::new(store, session.clone(), reachability.clone())
            .with_config(&config.cloud);

        info!(
            "persistence ready: local store {}, remote {}",
            local.directory().display(),
            config.cloud.api_base_url
        );

        Ok(Self {
            config,
            engine,
            session,
            reachability,
            router: PrivacyRouter::new(local, remote),
            probe: None,
        })
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    pub fn router(&self) -> &PrivacyRouter {
        &self.router
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reachability(&self) -> &ReachabilityMonitor {
        &self.reachability
    }

    pub fn engine(&self) -> &Arc<EncryptionEngine> {
        &self.engine
    }

    pub fn local_store(&self) -> &LocalEncryptedStore {
        self.router.local_store()
    }

    /// Starts the background connectivity probe. Must be called inside a
    /// tokio runtime; a second call replaces the first probe.
    pub fn start_reachability_probe(&mut self) {
        let handle = self.reachability.spawn_probe(self.config.reachability.clone());
        self.probe = Some(handle);
    }

    /// Recovery path for undecryptable local data: deletes every local blob,
    /// then re-derives the at-rest key.
    ///
    /// Returns the number of local items deleted. Remote data is untouched.
    pub async fn reset_encryption_and_clear_data(&self) -> PersistenceResult<usize> {
        warn!("resetting at-rest encryption: wiping local store");
        let removed = self.local_store().clear_all().await?;
        let changed = self.engine.regenerate_key()?;
        warn!("local store wiped ({removed} items), key regenerated (changed: {changed})");
        Ok(removed)
    }
}
