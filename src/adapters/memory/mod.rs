//! In-memory adapters backing tests and offline runs.
//!
//! Each adapter clones cheaply around a shared `Arc`, so a test can keep
//! one handle for assertions while the context owns another.

pub mod clock;
pub mod store;
pub mod tracker;

pub use clock::FixedClock;
pub use store::MemoryRecordStore;
pub use tracker::MemoryTracker;
