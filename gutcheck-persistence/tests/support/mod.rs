#![allow(dead_code)]

use gutcheck_cloud::{MemoryDocumentStore, Session};
use gutcheck_crypto::StaticDeviceId;
use gutcheck_persistence::{PersistenceConfig, PersistenceContext, PrivacyClassification, Storable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptom {
    pub id: String,
    pub owner_id: String,
    pub notes: String,
    pub severity: u8,
}

impl Symptom {
    pub fn new(id: &str, owner_id: &str, notes: &str, severity: u8) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            notes: notes.into(),
            severity,
        }
    }
}

impl Storable for Symptom {
    const ENTITY_TYPE: &'static str = "symptom";
    const COLLECTION: &'static str = "symptoms";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn privacy_classification(&self) -> PrivacyClassification {
        PrivacyClassification::Private
    }
}

/// A meal whose classification is chosen per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub calories: u32,
    pub privacy: PrivacyClassification,
}

impl Meal {
    pub fn new(id: &str, owner_id: &str, name: &str, calories: u32, privacy: PrivacyClassification) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            name: name.into(),
            calories,
            privacy,
        }
    }

    pub fn public(id: &str, owner_id: &str, name: &str, calories: u32) -> Self {
        Self::new(id, owner_id, name, calories, PrivacyClassification::Public)
    }
}

impl Storable for Meal {
    const ENTITY_TYPE: &'static str = "meal";
    const COLLECTION: &'static str = "meals";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn privacy_classification(&self) -> PrivacyClassification {
        self.privacy
    }
}

pub struct Harness {
    pub ctx: PersistenceContext,
    pub remote: Arc<MemoryDocumentStore>,
    pub dir: TempDir,
}

/// A context over a temp dir and an in-memory document store, signed in as
/// `u1`.
pub fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MemoryDocumentStore::new());
    let ctx = PersistenceContext::with_parts(
        PersistenceConfig::with_data_dir(dir.path()),
        Arc::new(StaticDeviceId::new("device-test")),
        remote.clone(),
        Session::signed_in("u1", "token"),
    )
    .unwrap();
    Harness { ctx, remote, dir }
}
