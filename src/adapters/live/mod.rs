//! Live adapters for real external interactions.

pub mod clock;
pub mod github;
pub mod store;

pub use clock::LiveClock;
pub use github::GithubTracker;
pub use store::FileRecordStore;
