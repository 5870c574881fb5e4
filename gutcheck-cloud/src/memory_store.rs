//! In-process document store for tests and offline development.

use crate::document_store::DocumentStore;
use crate::error::{CloudError, CloudResult};
use crate::types::{RemoteQuery, RemoteRecord};
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

/// Operations of [`DocumentStore`], for failure injection and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    SetMerge,
    Get,
    Query,
    Delete,
}

type Collections = HashMap<String, BTreeMap<String, Map<String, Value>>>;

/// A [`DocumentStore`] backed by in-memory maps.
///
/// Errors queued with [`fail_next`](Self::fail_next) are returned, in order,
/// by the next calls of that operation before any state is touched.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<Collections>,
    failures: Mutex<HashMap<StoreOp, VecDeque<CloudError>>>,
    calls: Mutex<HashMap<StoreOp, usize>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `err` to be returned by the next call of `op`.
    pub fn fail_next(&self, op: StoreOp, err: CloudError) {
        self.failures
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(op)
            .or_default()
            .push_back(err);
    }

    /// Number of calls made to `op`, failed ones included.
    pub fn call_count(&self, op: StoreOp) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&op)
            .copied()
            .unwrap_or(0)
    }

    /// Seeds a document directly, bypassing the adapter.
    pub fn insert(&self, collection: &str, id: &str, fields: Map<String, Value>) {
        self.collections
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Reads a document without counting a call.
    pub fn document(&self, collection: &str, id: &str) -> Option<Map<String, Value>> {
        self.collections
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(collection)?
            .get(id)
            .cloned()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn begin(&self, op: StoreOp) -> CloudResult<()> {
        *self
            .calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(op)
            .or_default() += 1;

        let injected = self
            .failures
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        match injected {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set_merge(&self, collection: &str, id: &str, fields: Map<String, Value>) -> CloudResult<()> {
        self.begin(StoreOp::SetMerge)?;
        let mut collections = self.collections.lock().unwrap_or_else(|p| p.into_inner());
        let doc = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();
        doc.extend(fields);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> CloudResult<Option<RemoteRecord>> {
        self.begin(StoreOp::Get)?;
        Ok(self
            .document(collection, id)
            .map(|fields| RemoteRecord::new(id, fields)))
    }

    async fn query(&self, collection: &str, query: &RemoteQuery) -> CloudResult<Vec<RemoteRecord>> {
        self.begin(StoreOp::Query)?;
        let matched: Vec<FieldsView> = {
            let collections = self.collections.lock().unwrap_or_else(|p| p.into_inner());
            collections
                .get(collection)
                .into_iter()
                .flatten()
                .map(|(id, fields)| RemoteRecord::new(id.clone(), fields.clone()))
                .filter(|record| query.matches(record))
                .map(FieldsView)
                .collect()
        };
        Ok(query
            .spec
            .sort_and_limit(matched)
            .into_iter()
            .map(|view| view.0)
            .collect())
    }

    async fn delete(&self, collection: &str, id: &str) -> CloudResult<()> {
        self.begin(StoreOp::Delete)?;
        if let Some(docs) = self
            .collections
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get_mut(collection)
        {
            docs.remove(id);
        }
        Ok(())
    }
}

/// Sorts a record by its fields rather than its envelope.
struct FieldsView(RemoteRecord);

impl Serialize for FieldsView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.fields.serialize(serializer)
    }
}
