//! `ghsync list` command: summarize records and their observed state.

use std::path::Path;

use crate::adapters::live::FileRecordStore;
use crate::ports::store::RecordStore;
use crate::reconcile::OPEN_CONDITION;
use crate::record::IssueRecord;

/// Execute the `list` command.
///
/// # Errors
///
/// Returns an error string when the store cannot be read.
pub fn run(store_root: &Path) -> Result<(), String> {
    let store = FileRecordStore::new(store_root);
    let names = store.list().map_err(|e| format!("Failed to list records: {e}"))?;
    if names.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    for name in names {
        let Some(record) =
            store.get(&name).map_err(|e| format!("Failed to read record {name}: {e}"))?
        else {
            continue;
        };
        println!("{}", summarize(&record));
    }
    Ok(())
}

/// One-line summary: name, repo, title, open status, lifecycle marker.
fn summarize(record: &IssueRecord) -> String {
    let open = record
        .status
        .conditions
        .iter()
        .find(|c| c.condition_type == OPEN_CONDITION)
        .map_or_else(|| "-".to_string(), |c| format!("{:?}", c.status));
    let marker = if record.is_terminating() { " (terminating)" } else { "" };
    format!(
        "{}\t{}\t{}\topen={open}{marker}",
        record.metadata.name, record.spec.repo, record.spec.title
    )
}
