//! Remote store configuration.

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for the remote document store adapter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL of the document store API (e.g., "https://api.gutcheck.app").
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Backoff policy for remote writes.
    pub retry: RetryPolicy,

    /// Fail fast with `Offline` while the reachability monitor reports no
    /// connectivity, instead of attempting the request anyway.
    pub short_circuit_when_offline: bool,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.gutcheck.app".to_string(),
            request_timeout_secs: 30,
            retry: RetryPolicy::default(),
            short_circuit_when_offline: false,
        }
    }
}

/// Configuration for the background connectivity probe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachabilityConfig {
    /// `host:port` the probe opens a TCP connection to.
    pub probe_addr: String,

    pub probe_interval_secs: u64,

    pub probe_timeout_secs: u64,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            probe_addr: "api.gutcheck.app:443".to_string(),
            probe_interval_secs: 30,
            probe_timeout_secs: 5,
        }
    }
}
