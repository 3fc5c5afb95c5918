//! `ghsync apply` command: create or update a record from a manifest.

use std::path::Path;

use serde::Deserialize;

use crate::adapters::live::FileRecordStore;
use crate::ports::store::RecordStore;
use crate::record::{IssueRecord, IssueSpec, IssueStatus, RecordMeta};
use crate::repo::RepoRef;

/// A record manifest as written by the record's owner.
#[derive(Debug, Deserialize)]
struct RecordManifest {
    name: String,
    spec: IssueSpec,
}

/// Execute the `apply` command.
///
/// Validates the repository URL up front (admission-time validation), then
/// creates the record or updates an existing record's spec in place.
///
/// # Errors
///
/// Returns an error string when the manifest cannot be read or parsed, the
/// repository URL is invalid, or the store write fails.
pub fn run(store_root: &Path, file: &Path) -> Result<(), String> {
    let contents = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read manifest {}: {e}", file.display()))?;
    let manifest: RecordManifest = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse manifest {}: {e}", file.display()))?;

    RepoRef::parse(&manifest.spec.repo).map_err(|e| e.to_string())?;

    let store = FileRecordStore::new(store_root);
    let existing = store
        .get(&manifest.name)
        .map_err(|e| format!("Failed to read record {}: {e}", manifest.name))?;

    match existing {
        Some(mut record) => {
            if record.is_terminating() {
                return Err(format!("Record {} is being deleted", manifest.name));
            }
            record.spec = manifest.spec;
            store
                .update(&record)
                .map_err(|e| format!("Failed to update record {}: {e}", manifest.name))?;
            println!("Updated record {}", manifest.name);
        }
        None => {
            let record = IssueRecord {
                metadata: RecordMeta::named(&manifest.name),
                spec: manifest.spec,
                status: IssueStatus::default(),
            };
            store
                .create(&record)
                .map_err(|e| format!("Failed to create record {}: {e}", manifest.name))?;
            println!("Created record {}", manifest.name);
        }
    }
    Ok(())
}
