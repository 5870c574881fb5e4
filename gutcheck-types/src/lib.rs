//! Core types for GutCheck persistence.
//!
//! Every record that passes through the persistence layer declares where it
//! is allowed to live:
//!
//! - **Private / Confidential** items stay on the device, encrypted at rest.
//! - **Public** items are synchronized to the shared remote document store.
//!
//! Domain models opt in by implementing [`Storable`]. Queries are described
//! with [`QueryBuilder`] so the same predicates can be evaluated by the remote
//! store and, in memory, against the local encrypted store.

mod classification;
mod item;
mod query;

pub use classification::{ParseClassificationError, PrivacyClassification};
pub use item::{Storable, StoredItem, OWNER_ID_FIELD};
pub use query::{FilterOp, Predicate, QueryBuilder, QuerySpec, SortDirection, SortOrder};
