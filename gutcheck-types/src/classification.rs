//! Per-item privacy classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares the storage destination of an item.
///
/// The classification is a property of the data, not of the call site: the
/// router derives every save from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyClassification {
    /// Device-local only, encrypted at rest.
    Private,
    /// Device-local only, encrypted at rest. Kept distinct from `Private`
    /// for auditing, routed identically.
    Confidential,
    /// Synchronized to the shared remote store.
    Public,
}

impl PrivacyClassification {
    /// Returns true if items with this classification must never leave the device.
    pub fn is_device_local(self) -> bool {
        matches!(self, Self::Private | Self::Confidential)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Confidential => "confidential",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for PrivacyClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown privacy classification: {0}")]
pub struct ParseClassificationError(pub String);

impl FromStr for PrivacyClassification {
    type Err = ParseClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "confidential" => Ok(Self::Confidential),
            "public" => Ok(Self::Public),
            _ => Err(ParseClassificationError(s.to_string())),
        }
    }
}
