//! Service context bundling all port trait objects.

use crate::adapters::live::{FileRecordStore, GithubTracker, LiveClock};
use crate::adapters::memory::{FixedClock, MemoryRecordStore, MemoryTracker};
use crate::config::Config;
use crate::error::Result;
use crate::ports::clock::Clock;
use crate::ports::store::RecordStore;
use crate::ports::tracker::IssueTracker;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors wire
/// up different adapter implementations (live, in-memory).
pub struct ServiceContext {
    /// Clock for condition transition times.
    pub clock: Box<dyn Clock>,
    /// Record store holding declarative issue records.
    pub store: Box<dyn RecordStore>,
    /// Remote issue tracker.
    pub tracker: Box<dyn IssueTracker>,
}

impl ServiceContext {
    /// Creates a live context: system clock, file-backed record store, and
    /// the GitHub REST tracker.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub client cannot be constructed from the
    /// configuration.
    pub fn live(config: &Config) -> Result<Self> {
        Ok(Self {
            clock: Box::new(LiveClock),
            store: Box::new(FileRecordStore::new(&config.store_root)),
            tracker: Box::new(GithubTracker::new(config)?),
        })
    }

    /// Creates a context over in-memory adapters.
    ///
    /// The caller keeps its own clones of the adapters for assertions; the
    /// clock is pinned to a fixed instant.
    #[must_use]
    pub fn memory(store: MemoryRecordStore, tracker: MemoryTracker) -> Self {
        Self {
            clock: Box::new(FixedClock::default()),
            store: Box::new(store),
            tracker: Box::new(tracker),
        }
    }
}
