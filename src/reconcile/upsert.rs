//! Upsert engine: converge one remote issue onto a record's desired state.
//!
//! Idempotent: once the remote issue matches, further passes make zero
//! mutating calls. The decision is a pure function over the freshly
//! fetched issue list, so read-then-decide races stay visible in tests.

use tracing::info;

use crate::error::{Error, Result};
use crate::ports::tracker::{IssueEdit, IssueTracker, RemoteIssue};
use crate::record::IssueSpec;
use crate::repo::RepoRef;

/// What a pass will do (or did) for a record's remote issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertAction {
    /// No issue matches the title; one will be created.
    Create,
    /// A matching issue exists but its body differs; only the body changes.
    UpdateBody {
        /// The matching issue as fetched.
        existing: RemoteIssue,
    },
    /// The matching issue already mirrors the desired state.
    Unchanged {
        /// The matching issue as fetched.
        existing: RemoteIssue,
    },
}

/// Finds the first issue whose title equals the target byte-for-byte.
#[must_use]
pub fn find_by_title<'a>(issues: &'a [RemoteIssue], title: &str) -> Option<&'a RemoteIssue> {
    issues.iter().find(|issue| issue.title == title)
}

/// Decides the create-or-update action for a record against a fetched list.
///
/// Duplicate titles are ambiguous; the first match wins (see DESIGN.md).
#[must_use]
pub fn plan(issues: &[RemoteIssue], spec: &IssueSpec) -> UpsertAction {
    match find_by_title(issues, &spec.title) {
        None => UpsertAction::Create,
        Some(found) if found.body_text() != spec.description => {
            UpsertAction::UpdateBody { existing: found.clone() }
        }
        Some(found) => UpsertAction::Unchanged { existing: found.clone() },
    }
}

/// Ensures exactly one remote issue matches the record's title and body.
///
/// Fetches the live issue list, then performs at most one mutating call.
/// Returns the converged remote issue.
///
/// # Errors
///
/// Returns [`Error::Upstream`] when any tracker call fails; no partial
/// local state is committed.
pub async fn apply(
    tracker: &dyn IssueTracker,
    repo: &RepoRef,
    spec: &IssueSpec,
) -> Result<RemoteIssue> {
    let issues = tracker
        .list_issues(&repo.owner, &repo.name)
        .await
        .map_err(|e| Error::upstream("listing issues", e))?;

    match plan(&issues, spec) {
        UpsertAction::Create => {
            let created = tracker
                .create_issue(&repo.owner, &repo.name, &spec.title, &spec.description)
                .await
                .map_err(|e| Error::upstream("creating issue", e))?;
            info!(owner = %repo.owner, repo = %repo.name, number = created.number, "created issue");
            Ok(created)
        }
        UpsertAction::UpdateBody { existing } => {
            let edit = IssueEdit { body: Some(spec.description.clone()), state: None };
            let edited = tracker
                .edit_issue(&repo.owner, &repo.name, existing.number, edit)
                .await
                .map_err(|e| Error::upstream("updating issue body", e))?;
            info!(owner = %repo.owner, repo = %repo.name, number = edited.number, "updated issue body");
            Ok(edited)
        }
        UpsertAction::Unchanged { existing } => Ok(existing),
    }
}
