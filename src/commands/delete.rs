//! `ghsync delete` command: request deletion of a record.

use std::path::Path;

use chrono::Utc;

use crate::adapters::live::FileRecordStore;
use crate::ports::store::RecordStore;

/// Execute the `delete` command.
///
/// Sets the record's deletion timestamp. A record the reconciler has seen
/// carries a finalizer, so it lingers until the next `run` pass closes the
/// remote issue and releases it; an unreconciled record is erased at once.
///
/// # Errors
///
/// Returns an error string when the record does not exist or the store
/// write fails.
pub fn run(store_root: &Path, name: &str) -> Result<(), String> {
    let store = FileRecordStore::new(store_root);
    let record = store
        .mark_deleted(name, Utc::now())
        .map_err(|e| format!("Failed to delete record {name}: {e}"))?;

    if record.metadata.finalizers.is_empty() {
        println!("Deleted record {name}");
    } else {
        println!("Marked record {name} for deletion; cleanup runs on the next pass");
    }
    Ok(())
}
