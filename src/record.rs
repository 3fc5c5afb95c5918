//! Declarative issue records and their condition-based status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Finalizer token gating record deletion until the remote issue is closed.
pub const FINALIZER: &str = "issuerecords.ghsync.dev/close-remote-issue";

/// A declarative record describing one desired GitHub issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Identity and lifecycle metadata.
    pub metadata: RecordMeta,
    /// Desired state, owned by the record's author.
    pub spec: IssueSpec,
    /// Observed state, written only by the reconciler.
    #[serde(default)]
    pub status: IssueStatus,
}

impl IssueRecord {
    /// True once deletion has been requested for this record.
    #[must_use]
    pub fn is_terminating(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// True when the reconciler's finalizer is attached.
    #[must_use]
    pub fn has_finalizer(&self) -> bool {
        self.metadata.finalizers.iter().any(|f| f == FINALIZER)
    }
}

/// Identity and lifecycle metadata for a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Unique record name within the store.
    pub name: String,
    /// Store-assigned unique identifier.
    #[serde(default)]
    pub uid: String,
    /// Monotonic version bumped by the store on every write; stale
    /// versions are rejected as conflicts.
    #[serde(default)]
    pub resource_version: u64,
    /// Tokens blocking permanent removal until cleanup completes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
    /// Set by the store when deletion is requested; the record is erased
    /// once this is set and no finalizers remain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

impl RecordMeta {
    /// Creates metadata for a record that has not been stored yet.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: String::new(),
            resource_version: 0,
            finalizers: Vec::new(),
            deletion_timestamp: None,
        }
    }
}

/// Desired issue state: which repository, and what the issue should say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSpec {
    /// Repository URL of the form `https://github.com/<owner>/<repo>`.
    pub repo: String,
    /// Issue title; acts as the natural key linking record to remote issue.
    pub title: String,
    /// Issue body.
    pub description: String,
}

/// Observed state projected back by the reconciler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueStatus {
    /// Latest observations, one entry per condition type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Tri-state outcome of one observed aspect of reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    /// The aspect holds.
    True,
    /// The aspect does not hold.
    False,
    /// The aspect could not be determined.
    Unknown,
}

impl ConditionStatus {
    /// Maps a remote issue state to a condition status.
    ///
    /// `open` observes as `True`, `closed` as `False`, anything else as
    /// `Unknown`.
    #[must_use]
    pub fn from_remote_state(state: &str) -> Self {
        match state {
            "open" => Self::True,
            "closed" => Self::False,
            _ => Self::Unknown,
        }
    }
}

/// A typed, timestamped status entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Condition type; unique within a status.
    #[serde(rename = "type")]
    pub condition_type: String,
    /// Tri-state outcome.
    pub status: ConditionStatus,
    /// Machine-readable cause.
    pub reason: String,
    /// Human-readable detail.
    pub message: String,
    /// When this condition last changed.
    pub last_transition_time: DateTime<Utc>,
}

/// Upserts a condition into a status list, keyed by type.
///
/// An entry with a previously unseen type is appended; an entry whose type
/// already exists replaces that entry in place, preserving order and count.
pub fn upsert_condition(conditions: &mut Vec<Condition>, next: Condition) {
    for existing in conditions.iter_mut() {
        if existing.condition_type == next.condition_type {
            *existing = next;
            return;
        }
    }
    conditions.push(next);
}
