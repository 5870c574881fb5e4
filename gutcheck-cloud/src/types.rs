//! Records and wire types exchanged with the document store.

use gutcheck_types::{OWNER_ID_FIELD, QuerySpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field stamped with the time of the last upsert (RFC 3339, UTC).
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// A document in a remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl RemoteRecord {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.fields.get(OWNER_ID_FIELD)?.as_str()
    }

    /// The fields as a JSON object, for predicate evaluation.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Owner-scoped query sent to the document store.
///
/// Serialized flat: `{ "owner_id", "predicates", "order_by", "limit" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteQuery {
    pub owner_id: String,
    #[serde(flatten)]
    pub spec: QuerySpec,
}

impl RemoteQuery {
    pub fn new(owner_id: impl Into<String>, spec: QuerySpec) -> Self {
        Self {
            owner_id: owner_id.into(),
            spec,
        }
    }

    /// Owner scope plus predicates, evaluated in memory.
    pub fn matches(&self, record: &RemoteRecord) -> bool {
        record.owner_id() == Some(self.owner_id.as_str()) && self.spec.matches(&record.to_value())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub documents: Vec<RemoteRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: String,
}
