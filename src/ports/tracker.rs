//! Issue tracker port for the remote GitHub side.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Boxed future type alias used by [`IssueTracker`] to keep the trait
/// dyn-compatible.
pub type TrackerFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// An issue as it exists in the remote tracker.
///
/// Never cached across reconcile passes; every decision re-fetches the live
/// list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIssue {
    /// Tracker-assigned issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body; the tracker reports `null` for issues without one.
    #[serde(default)]
    pub body: Option<String>,
    /// Current state, `open` or `closed`.
    pub state: String,
}

impl RemoteIssue {
    /// The issue body, with a missing body read as empty.
    #[must_use]
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// A partial edit to an existing issue; unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueEdit {
    /// New body, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// New state (`open` or `closed`), if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Manages issues in the remote tracker.
///
/// Every call is bounded by the configured request timeout and surfaces
/// transport failures as boxed errors for the engine to wrap.
pub trait IssueTracker: Send + Sync {
    /// Lists all issues (open and closed) in a repository.
    fn list_issues(&self, owner: &str, repo: &str) -> TrackerFuture<'_, Vec<RemoteIssue>>;

    /// Creates a new open issue and returns it with its assigned number.
    fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> TrackerFuture<'_, RemoteIssue>;

    /// Applies a partial edit to an existing issue and returns the result.
    fn edit_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        edit: IssueEdit,
    ) -> TrackerFuture<'_, RemoteIssue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_body_reads_as_empty() {
        let issue: RemoteIssue =
            serde_json::from_str(r#"{"number": 3, "title": "T", "body": null, "state": "open"}"#)
                .unwrap();
        assert_eq!(issue.body_text(), "");
    }

    #[test]
    fn edit_serializes_only_set_fields() {
        let edit = IssueEdit { body: None, state: Some("closed".into()) };
        let json = serde_json::to_string(&edit).unwrap();
        assert_eq!(json, r#"{"state":"closed"}"#);
    }
}
