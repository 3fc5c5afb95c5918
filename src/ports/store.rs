//! Record store port: the control-plane home of issue records.

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::record::IssueRecord;

/// Stores and versions declarative issue records.
///
/// The store owns lifecycle mechanics the reconciler relies on: every write
/// bumps the record's resource version and rejects stale writers with
/// [`StoreError::Conflict`], and a terminating record is erased the moment
/// its last finalizer is removed.
pub trait RecordStore: Send + Sync {
    /// Fetches a record by name, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store itself fails; a missing record is not
    /// an error.
    fn get(&self, name: &str) -> Result<Option<IssueRecord>, StoreError>;

    /// Lists the names of all stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Persists a new record, assigning its uid and initial resource version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if a record with the same name
    /// already exists.
    fn create(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError>;

    /// Persists spec and metadata changes to an existing record.
    ///
    /// Erases the record instead when it is terminating and the write leaves
    /// no finalizers behind.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the record's resource version
    /// is stale, [`StoreError::NotFound`] when it no longer exists.
    fn update(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError>;

    /// Persists only the record's status, leaving spec and metadata as stored.
    ///
    /// # Errors
    ///
    /// Same conflict and not-found semantics as [`RecordStore::update`].
    fn update_status(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError>;

    /// Requests deletion of a record.
    ///
    /// Sets the deletion timestamp; the record is erased immediately when no
    /// finalizers are attached, and otherwise lingers until a later
    /// [`RecordStore::update`] removes the last finalizer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the record does not exist.
    fn mark_deleted(&self, name: &str, now: DateTime<Utc>) -> Result<IssueRecord, StoreError>;
}
