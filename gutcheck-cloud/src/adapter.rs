//! Owner-scoped, retrying front end to a [`DocumentStore`].

use crate::config::CloudConfig;
use crate::document_store::DocumentStore;
use crate::error::{CloudError, CloudResult};
use crate::reachability::ReachabilityMonitor;
use crate::retry::{CancelFlag, RetryPolicy};
use crate::session::Session;
use crate::types::{RemoteQuery, RemoteRecord, UPDATED_AT_FIELD};
use gutcheck_types::{OWNER_ID_FIELD, QuerySpec};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Remote store adapter.
///
/// Resolves the owner from the [`Session`] (failing with `NotAuthenticated`
/// before any I/O), wraps writes in [`RetryPolicy::run`], and consults the
/// [`ReachabilityMonitor`] as a hint.
#[derive(Clone)]
pub struct RemoteStoreAdapter {
    store: Arc<dyn DocumentStore>,
    session: Session,
    reachability: ReachabilityMonitor,
    retry: RetryPolicy,
    short_circuit_when_offline: bool,
}

impl RemoteStoreAdapter {
    pub fn new(store: Arc<dyn DocumentStore>, session: Session, reachability: ReachabilityMonitor) -> Self {
        Self {
            store,
            session,
            reachability,
            retry: RetryPolicy::default(),
            short_circuit_when_offline: false,
        }
    }

    /// Applies the retry policy and offline behaviour from `config`.
    pub fn with_config(self, config: &CloudConfig) -> Self {
        self.with_retry_policy(config.retry.clone())
            .short_circuit_when_offline(config.short_circuit_when_offline)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn short_circuit_when_offline(mut self, enabled: bool) -> Self {
        self.short_circuit_when_offline = enabled;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reachability(&self) -> &ReachabilityMonitor {
        &self.reachability
    }

    /// Stamps `ownerId` and `updatedAt` into `fields` and merge-writes the
    /// document, retrying transient failures.
    pub async fn upsert(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        owner_id: &str,
    ) -> CloudResult<()> {
        self.upsert_cancellable(collection, id, fields, owner_id, &CancelFlag::new())
            .await
    }

    pub async fn upsert_cancellable(
        &self,
        collection: &str,
        id: &str,
        mut fields: Map<String, Value>,
        owner_id: &str,
        cancel: &CancelFlag,
    ) -> CloudResult<()> {
        self.precheck("upsert", collection)?;
        if owner_id.is_empty() {
            return Err(CloudError::NotAuthenticated);
        }

        fields.insert(OWNER_ID_FIELD.to_string(), Value::String(owner_id.to_string()));
        fields.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );

        let op_name = format!("upsert {collection}/{id}");
        self.retry
            .run(&op_name, cancel, || self.store.set_merge(collection, id, fields.clone()))
            .await?;
        debug!("upserted {collection}/{id}");
        Ok(())
    }

    /// Single attempt. Absence is `Ok(None)`.
    pub async fn get(&self, collection: &str, id: &str) -> CloudResult<Option<RemoteRecord>> {
        self.precheck("get", collection)?;
        RetryPolicy::once(&format!("get {collection}/{id}"), self.store.get(collection, id)).await
    }

    /// Documents in `collection` owned by `owner_id` and matching `spec`.
    ///
    /// Ordering and limit in `spec` are applied by the store to this result
    /// only. Single attempt.
    pub async fn query_by_owner(
        &self,
        collection: &str,
        owner_id: &str,
        spec: &QuerySpec,
    ) -> CloudResult<Vec<RemoteRecord>> {
        self.precheck("query", collection)?;
        if owner_id.is_empty() {
            return Err(CloudError::NotAuthenticated);
        }

        let query = RemoteQuery::new(owner_id, spec.clone());
        let records = RetryPolicy::once(&format!("query {collection}"), self.store.query(collection, &query)).await?;
        debug!("query {collection} returned {} documents", records.len());
        Ok(records)
    }

    /// Deletes a document, retrying transient failures. Absence counts as
    /// success.
    pub async fn delete(&self, collection: &str, id: &str) -> CloudResult<()> {
        self.delete_cancellable(collection, id, &CancelFlag::new()).await
    }

    pub async fn delete_cancellable(&self, collection: &str, id: &str, cancel: &CancelFlag) -> CloudResult<()> {
        self.precheck("delete", collection)?;
        let op_name = format!("delete {collection}/{id}");
        match self
            .retry
            .run(&op_name, cancel, || self.store.delete(collection, id))
            .await
        {
            Ok(()) | Err(CloudError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Owner check, then the advisory reachability check.
    fn precheck(&self, op: &str, collection: &str) -> CloudResult<()> {
        self.session.require_owner()?;
        if !self.reachability.is_online() {
            if self.short_circuit_when_offline {
                debug!("{op} {collection}: offline, failing fast");
                return Err(CloudError::Offline);
            }
            debug!("{op} {collection}: reported offline, attempting anyway");
        }
        Ok(())
    }
}
