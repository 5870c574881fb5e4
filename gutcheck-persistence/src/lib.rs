//! Privacy-classified persistence for GutCheck.
//!
//! Every [`Storable`] item declares a [`PrivacyClassification`]. The
//! [`PrivacyRouter`] keeps `Private` and `Confidential` items on the device,
//! encrypted at rest, and sends `Public` items to the shared remote document
//! store. Reads check the local store first; deletes hit both; queries merge
//! both with the local copy winning.
//!
//! ```no_run
//! # async fn demo() -> gutcheck_persistence::PersistenceResult<()> {
//! use gutcheck_persistence::{PersistenceConfig, PersistenceContext};
//!
//! let ctx = PersistenceContext::new(PersistenceConfig::with_data_dir("/var/lib/gutcheck"))?;
//! ctx.session().sign_in("user-1", "access-token");
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod error;
mod logging;
mod merge;
mod router;

pub use config::PersistenceConfig;
pub use context::PersistenceContext;
pub use error::{PersistenceError, PersistenceResult};
pub use logging::init_tracing;
pub use merge::merge_by_id;
pub use router::PrivacyRouter;

pub use gutcheck_types::{
    FilterOp, PrivacyClassification, QueryBuilder, QuerySpec, SortDirection, Storable, StoredItem,
};
