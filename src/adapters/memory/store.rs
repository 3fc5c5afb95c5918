//! In-memory record store with conflict injection for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::ports::store::RecordStore;
use crate::record::IssueRecord;

#[derive(Default)]
struct StoreState {
    records: HashMap<String, IssueRecord>,
    conflicts_to_inject: usize,
}

/// In-memory record store mirroring [`FileRecordStore`] semantics.
///
/// [`FileRecordStore`]: crate::adapters::live::FileRecordStore
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` status writes fail with a conflict, as a
    /// concurrent writer would cause.
    pub fn inject_status_conflicts(&self, count: usize) {
        self.state.lock().expect("store lock").conflicts_to_inject = count;
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, name: &str) -> Result<Option<IssueRecord>, StoreError> {
        Ok(self.state.lock().expect("store lock").records.get(name).cloned())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> =
            self.state.lock().expect("store lock").records.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn create(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError> {
        let mut state = self.state.lock().expect("store lock");
        let name = record.metadata.name.clone();
        if state.records.contains_key(&name) {
            return Err(StoreError::Conflict(name));
        }
        let mut created = record.clone();
        created.metadata.uid = Uuid::new_v4().to_string();
        created.metadata.resource_version = 1;
        state.records.insert(name, created.clone());
        Ok(created)
    }

    fn update(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError> {
        let mut state = self.state.lock().expect("store lock");
        let name = record.metadata.name.clone();
        let stored =
            state.records.get(&name).ok_or_else(|| StoreError::NotFound(name.clone()))?;
        if stored.metadata.resource_version != record.metadata.resource_version {
            return Err(StoreError::Conflict(name));
        }

        if record.is_terminating() && record.metadata.finalizers.is_empty() {
            state.records.remove(&name);
            return Ok(record.clone());
        }

        let mut next = record.clone();
        next.metadata.resource_version += 1;
        state.records.insert(name, next.clone());
        Ok(next)
    }

    fn update_status(&self, record: &IssueRecord) -> Result<IssueRecord, StoreError> {
        let mut state = self.state.lock().expect("store lock");
        let name = record.metadata.name.clone();
        if state.conflicts_to_inject > 0 {
            state.conflicts_to_inject -= 1;
            return Err(StoreError::Conflict(name));
        }
        let stored =
            state.records.get(&name).ok_or_else(|| StoreError::NotFound(name.clone()))?;
        if stored.metadata.resource_version != record.metadata.resource_version {
            return Err(StoreError::Conflict(name));
        }
        let mut next = stored.clone();
        next.status = record.status.clone();
        next.metadata.resource_version += 1;
        state.records.insert(name, next.clone());
        Ok(next)
    }

    fn mark_deleted(&self, name: &str, now: DateTime<Utc>) -> Result<IssueRecord, StoreError> {
        let mut state = self.state.lock().expect("store lock");
        let stored = state
            .records
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        if stored.metadata.deletion_timestamp.is_none() {
            stored.metadata.deletion_timestamp = Some(now);
        }
        if stored.metadata.finalizers.is_empty() {
            let gone = stored.clone();
            state.records.remove(name);
            return Ok(gone);
        }
        stored.metadata.resource_version += 1;
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{IssueSpec, IssueStatus, RecordMeta, FINALIZER};

    fn record(name: &str) -> IssueRecord {
        IssueRecord {
            metadata: RecordMeta::named(name),
            spec: IssueSpec {
                repo: "https://github.com/acme/widgets".into(),
                title: "T1".into(),
                description: "D1".into(),
            },
            status: IssueStatus::default(),
        }
    }

    #[test]
    fn create_then_get_round_trips() {
        let store = MemoryRecordStore::new();
        let created = store.create(&record("demo")).unwrap();
        assert_eq!(created.metadata.resource_version, 1);
        assert!(store.get("demo").unwrap().is_some());
        assert_eq!(store.list().unwrap(), vec!["demo"]);
    }

    #[test]
    fn stale_writer_conflicts() {
        let store = MemoryRecordStore::new();
        let created = store.create(&record("demo")).unwrap();
        store.update(&created).unwrap();

        let err = store.update(&created).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn injected_conflict_hits_next_status_write() {
        let store = MemoryRecordStore::new();
        let created = store.create(&record("demo")).unwrap();
        store.inject_status_conflicts(1);

        assert!(matches!(store.update_status(&created), Err(StoreError::Conflict(_))));
        let fresh = store.get("demo").unwrap().unwrap();
        assert!(store.update_status(&fresh).is_ok());
    }

    #[test]
    fn finalizer_gates_erasure() {
        let store = MemoryRecordStore::new();
        let mut created = store.create(&record("demo")).unwrap();
        created.metadata.finalizers.push(FINALIZER.into());
        store.update(&created).unwrap();

        store.mark_deleted("demo", Utc::now()).unwrap();
        assert!(store.get("demo").unwrap().is_some());

        let mut released = store.get("demo").unwrap().unwrap();
        released.metadata.finalizers.clear();
        store.update(&released).unwrap();
        assert!(store.get("demo").unwrap().is_none());
    }
}
