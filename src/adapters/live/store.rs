//! File-backed record store keeping one YAML file per record.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::ports::store::RecordStore;
use crate::record::IssueRecord;

/// Record store persisting each record as `<root>/<name>.yaml`.
///
/// Implements the store-side lifecycle contract: resource versions bump on
/// every write, stale writers get a conflict, and a terminating record is
/// erased once its last finalizer is removed.
pub struct FileRecordStore {
    root: PathBuf,
}

impl FileRecordStore {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.yaml"))
    }

    fn load(&self, name: &str) -> Result<Option<IssueRecord>, StoreError> {
        let contents = match std::fs::read_to_string(self.record_path(name)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(format!("reading record {name}: {e}"))),
        };
        let record = serde_yaml::from_str(&contents)
            .map_err(|e| StoreError::Io(format!("parsing record {name}: {e}")))?;
        Ok(Some(record))
    }

    fn persist(&self, record: &IssueRecord) -> Result<(), StoreError> {
        let name = &record.metadata.name;
        std::fs::create_dir_all(&self.root)
            .map_err(|e| StoreError::Io(format!("creating store directory: {e}")))?;
        let yaml = serde_yaml::to_string(record)
            .map_err(|e| StoreError::Io(format!("serializing record {name}: {e}")))?;
        std::fs::write(self.record_path(name), yaml)
            .map_err(|e| StoreError::Io(format!("writing record {name}: {e}")))
    }

    fn erase(&self, name: &str) -> Result<(), StoreError> {
        std::fs::remove_file(self.record_path(name))
            .map_err(|e| StoreError::Io(format!("erasing record {name}: {e}")))
    }

    fn stored_for_write(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError> {
        let name = &record.metadata.name;
        let stored = self.load(name)?.ok_or_else(|| StoreError::NotFound(name.clone()))?;
        if stored.metadata.resource_version != record.metadata.resource_version {
            return Err(StoreError::Conflict(name.clone()));
        }
        Ok(stored)
    }
}

impl RecordStore for FileRecordStore {
    fn get(&self, name: &str) -> Result<Option<IssueRecord>, StoreError> {
        self.load(name)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(format!("listing store directory: {e}"))),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io(format!("listing store: {e}")))?;
            let file_name = entry.file_name();
            if let Some(name) = file_name.to_string_lossy().strip_suffix(".yaml") {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn create(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError> {
        let name = &record.metadata.name;
        if self.load(name)?.is_some() {
            return Err(StoreError::Conflict(name.clone()));
        }
        let mut created = record.clone();
        created.metadata.uid = Uuid::new_v4().to_string();
        created.metadata.resource_version = 1;
        self.persist(&created)?;
        Ok(created)
    }

    fn update(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError> {
        self.stored_for_write(record)?;

        // Removing the last finalizer from a terminating record is what
        // lets the store erase it.
        if record.is_terminating() && record.metadata.finalizers.is_empty() {
            self.erase(&record.metadata.name)?;
            return Ok(record.clone());
        }

        let mut next = record.clone();
        next.metadata.resource_version += 1;
        self.persist(&next)?;
        Ok(next)
    }

    fn update_status(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError> {
        let mut stored = self.stored_for_write(record)?;
        stored.status = record.status.clone();
        stored.metadata.resource_version += 1;
        self.persist(&stored)?;
        Ok(stored)
    }

    fn mark_deleted(&self, name: &str, now: DateTime<Utc>) -> Result<IssueRecord, StoreError> {
        let mut stored = self.load(name)?.ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        if stored.metadata.deletion_timestamp.is_none() {
            stored.metadata.deletion_timestamp = Some(now);
        }
        if stored.metadata.finalizers.is_empty() {
            self.erase(name)?;
            return Ok(stored);
        }
        stored.metadata.resource_version += 1;
        self.persist(&stored)?;
        Ok(stored)
    }
}
