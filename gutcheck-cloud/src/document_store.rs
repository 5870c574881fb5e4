//! The remote document store seam.

use crate::error::CloudResult;
use crate::types::{RemoteQuery, RemoteRecord};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A shared document database holding one collection per entity type.
///
/// Implementations perform a single attempt per call; retry and owner
/// resolution live in [`RemoteStoreAdapter`](crate::RemoteStoreAdapter).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates the document or merges `fields` into the existing one.
    async fn set_merge(&self, collection: &str, id: &str, fields: Map<String, Value>) -> CloudResult<()>;

    /// Absence is `Ok(None)`.
    async fn get(&self, collection: &str, id: &str) -> CloudResult<Option<RemoteRecord>>;

    async fn query(&self, collection: &str, query: &RemoteQuery) -> CloudResult<Vec<RemoteRecord>>;

    /// Deleting an absent document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> CloudResult<()>;
}
