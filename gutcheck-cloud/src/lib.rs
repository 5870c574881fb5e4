//! Remote document store access for GutCheck.
//!
//! [`RemoteStoreAdapter`] is the entry point: it scopes every operation to
//! the signed-in owner, retries transient write failures with exponential
//! backoff, and treats a missing document as success on delete. The wire
//! transport sits behind [`DocumentStore`], with [`HttpDocumentStore`] for
//! the real service and [`MemoryDocumentStore`] for tests.
//!
//! [`ReachabilityMonitor`] carries an advisory online/offline flag. It never
//! decides correctness; request failures do.

pub mod adapter;
pub mod config;
pub mod document_store;
pub mod error;
pub mod http_store;
pub mod memory_store;
pub mod reachability;
pub mod retry;
pub mod session;
pub mod types;

pub use adapter::RemoteStoreAdapter;
pub use config::{CloudConfig, ReachabilityConfig};
pub use document_store::DocumentStore;
pub use error::{CloudError, CloudResult};
pub use http_store::HttpDocumentStore;
pub use memory_store::{MemoryDocumentStore, StoreOp};
pub use reachability::{ConnectivityEvent, ProbeHandle, ReachabilityMonitor};
pub use retry::{CancelFlag, RetryPolicy};
pub use session::Session;
pub use types::{RemoteQuery, RemoteRecord, UPDATED_AT_FIELD};
