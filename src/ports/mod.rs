//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the reconciliation core and an
//! external system (time, the record store, the issue tracker).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod store;
pub mod tracker;

pub use clock::Clock;
pub use store::RecordStore;
pub use tracker::{IssueEdit, IssueTracker, RemoteIssue, TrackerFuture};
