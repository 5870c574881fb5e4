//! Privacy router: dispatches each operation by the item's classification.
//!
//! | classification         | save         | fetch                 | delete | query            |
//! |------------------------|--------------|-----------------------|--------|------------------|
//! | Private, Confidential  | local only   | local, then remote    | both   | both, local wins |
//! | Public                 | remote only  | local, then remote    | both   | both, local wins |
//!
//! A save is never written to both stores, and a failed local save is never
//! redirected to the remote store.

use crate::error::PersistenceResult;
use crate::merge::merge_by_id;
use gutcheck_cloud::RemoteStoreAdapter;
use gutcheck_storage::LocalEncryptedStore;
use gutcheck_types::{QueryBuilder, QuerySpec, Storable, StoredItem};
use serde_json::Value;
use tracing::debug;

#[derive(Clone)]
pub struct PrivacyRouter {
    local: LocalEncryptedStore,
    remote: RemoteStoreAdapter,
}

impl PrivacyRouter {
    pub fn new(local: LocalEncryptedStore, remote: RemoteStoreAdapter) -> Self {
        Self { local, remote }
    }

    pub fn local_store(&self) -> &LocalEncryptedStore {
        &self.local
    }

    pub fn remote(&self) -> &RemoteStoreAdapter {
        &self.remote
    }

    /// Writes `item` to the destination its classification requires.
    pub async fn save<T: Storable>(&self, item: &T) -> PersistenceResult<()> {
        let stored = item.to_stored_item()?;
        self.save_stored(stored).await
    }

    /// Routes a type-erased item by its classification.
    pub async fn save_stored(&self, item: StoredItem) -> PersistenceResult<()> {
        let classification = item.classification;
        if classification.is_device_local() {
            let bytes = item.payload_bytes()?;
            self.local.store(&item.entity_type, &item.id, &bytes).await?;
            debug!("saved {}/{} ({classification}) to local store", item.entity_type, item.id);
        } else {
            self.remote
                .upsert(&item.collection, &item.id, item.payload, &item.owner_id)
                .await?;
            debug!("saved {}/{} ({classification}) to remote store", item.entity_type, item.id);
        }
        Ok(())
    }

    /// Local store first, remote on a miss.
    ///
    /// A local blob that fails to decrypt is an error; the remote store is
    /// not consulted in that case.
    pub async fn fetch<T: Storable>(&self, id: &str) -> PersistenceResult<Option<T>> {
        if let Some(bytes) = self.local.retrieve(T::ENTITY_TYPE, id).await? {
            debug!("fetched {}/{id} from local store", T::ENTITY_TYPE);
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        match self.remote.get(T::COLLECTION, id).await? {
            Some(record) => {
                debug!("fetched {}/{id} from remote store", T::ENTITY_TYPE);
                Ok(Some(T::from_fields(record.fields)?))
            }
            None => Ok(None),
        }
    }

    /// Deletes from both stores, so a copy left behind by an earlier
    /// classification does not survive.
    ///
    /// Both deletes are attempted; the local error is reported first. The
    /// remote leg needs a signed-in owner: while signed out this returns
    /// `NotAuthenticated` on every call, even though the local copy is
    /// already gone after the first.
    pub async fn delete<T: Storable>(&self, id: &str) -> PersistenceResult<()> {
        let local = self.local.delete(T::ENTITY_TYPE, id).await;
        let remote = self.remote.delete(T::COLLECTION, id).await;
        local?;
        remote?;
        debug!("deleted {}/{id} from both stores", T::ENTITY_TYPE);
        Ok(())
    }

    /// Runs a query built by `build` against both stores and merges the
    /// results, local first, one item per id.
    ///
    /// Local results come back in id order. Ordering and limit are applied
    /// by the remote store to its own results only; apply the final order
    /// with [`QuerySpec::sort_and_limit`].
    pub async fn query<T, F>(&self, build: F) -> PersistenceResult<Vec<T>>
    where
        T: Storable,
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let spec = build(QueryBuilder::new()).build();
        self.query_spec(&spec).await
    }

    pub async fn query_spec<T: Storable>(&self, spec: &QuerySpec) -> PersistenceResult<Vec<T>> {
        let owner_id = self.remote.session().require_owner()?;

        let local = self.query_local::<T>(&owner_id, spec).await?;
        let remote = self
            .remote
            .query_by_owner(T::COLLECTION, &owner_id, spec)
            .await?
            .into_iter()
            .map(|record| T::from_fields(record.fields))
            .collect::<Result<Vec<T>, _>>()?;

        let (local_count, remote_count) = (local.len(), remote.len());
        let merged = merge_by_id(local, remote);
        debug!(
            "query {}: {local_count} local + {remote_count} remote -> {} merged",
            T::ENTITY_TYPE,
            merged.len()
        );
        Ok(merged)
    }

    /// Scans every local item of `T`, keeping those owned by `owner_id` that
    /// satisfy the predicates.
    async fn query_local<T: Storable>(&self, owner_id: &str, spec: &QuerySpec) -> PersistenceResult<Vec<T>> {
        let mut matched = Vec::new();
        for (_, bytes) in self.local.retrieve_all(T::ENTITY_TYPE).await? {
            let doc: Value = serde_json::from_slice(&bytes)?;
            if !spec.matches(&doc) {
                continue;
            }
            let item: T = serde_json::from_value(doc)?;
            if item.owner_id() == owner_id {
                matched.push(item);
            }
        }
        Ok(matched)
    }
}
