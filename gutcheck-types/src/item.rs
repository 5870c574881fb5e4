//! The storable item contract.

use crate::classification::PrivacyClassification;
use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field stamped onto every remote record to scope queries by owner.
pub const OWNER_ID_FIELD: &str = "ownerId";

/// A domain model the persistence layer can route, store and query.
///
/// `ENTITY_TYPE` names local files (`{ENTITY_TYPE}_{id}.encrypted`) and must
/// not contain `_`. `COLLECTION` names the remote collection holding the
/// public copies of this type.
pub trait Storable: Serialize + DeserializeOwned + Send + Sync {
    const ENTITY_TYPE: &'static str;
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn owner_id(&self) -> &str;

    fn privacy_classification(&self) -> PrivacyClassification;

    /// Serializes the item into a JSON field map.
    ///
    /// Fails if the model does not serialize to a JSON object.
    fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(serde_json::Error::custom(format!(
                "{} must serialize to a JSON object, got {}",
                Self::ENTITY_TYPE,
                json_kind(&other)
            ))),
        }
    }

    fn from_fields(fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(fields))
    }

    /// Type-erased view of this item.
    fn to_stored_item(&self) -> Result<StoredItem, serde_json::Error> {
        Ok(StoredItem {
            entity_type: Self::ENTITY_TYPE.to_string(),
            collection: Self::COLLECTION.to_string(),
            id: self.id().to_string(),
            owner_id: self.owner_id().to_string(),
            classification: self.privacy_classification(),
            payload: self.to_fields()?,
        })
    }
}

/// A routed record with its identity, owner, classification and payload.
///
/// Identity is `(entity_type, id)`; exactly one authoritative copy exists
/// across the local and remote stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    pub entity_type: String,
    pub collection: String,
    pub id: String,
    pub owner_id: String,
    pub classification: PrivacyClassification,
    pub payload: Map<String, Value>,
}

impl StoredItem {
    /// Payload bytes as written to the local store.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.payload)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
