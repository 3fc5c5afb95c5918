//! In-memory issue tracker with call counters and failure injection.

use std::sync::{Arc, Mutex};

use crate::ports::tracker::{IssueEdit, IssueTracker, RemoteIssue, TrackerFuture};

#[derive(Default)]
struct TrackerState {
    issues: Vec<RemoteIssue>,
    next_number: u64,
    list_calls: usize,
    create_calls: usize,
    edit_calls: usize,
    fail_mutations: bool,
}

/// In-memory tracker standing in for GitHub.
///
/// Ignores the owner/repo arguments: one instance models one repository,
/// matching the one-repo-per-record reconcile scope.
#[derive(Clone, Default)]
pub struct MemoryTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl MemoryTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the tracker with pre-existing issues.
    #[must_use]
    pub fn with_issues(issues: Vec<RemoteIssue>) -> Self {
        let next_number = issues.iter().map(|i| i.number).max().unwrap_or(0) + 1;
        let tracker = Self::default();
        {
            let mut state = tracker.state.lock().expect("tracker lock");
            state.issues = issues;
            state.next_number = next_number;
        }
        tracker
    }

    /// Snapshot of the current remote issues.
    #[must_use]
    pub fn issues(&self) -> Vec<RemoteIssue> {
        self.state.lock().expect("tracker lock").issues.clone()
    }

    /// Total create and edit calls observed so far.
    #[must_use]
    pub fn mutating_calls(&self) -> usize {
        let state = self.state.lock().expect("tracker lock");
        state.create_calls + state.edit_calls
    }

    /// Number of list calls observed so far.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.state.lock().expect("tracker lock").list_calls
    }

    /// When set, every mutating call fails with a simulated outage.
    pub fn set_fail_mutations(&self, fail: bool) {
        self.state.lock().expect("tracker lock").fail_mutations = fail;
    }
}

impl IssueTracker for MemoryTracker {
    fn list_issues(&self, _owner: &str, _repo: &str) -> TrackerFuture<'_, Vec<RemoteIssue>> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let mut state = state.lock().expect("tracker lock");
            state.list_calls += 1;
            Ok(state.issues.clone())
        })
    }

    fn create_issue(
        &self,
        _owner: &str,
        _repo: &str,
        title: &str,
        body: &str,
    ) -> TrackerFuture<'_, RemoteIssue> {
        let state = Arc::clone(&self.state);
        let title = title.to_string();
        let body = body.to_string();
        Box::pin(async move {
            let mut state = state.lock().expect("tracker lock");
            state.create_calls += 1;
            if state.fail_mutations {
                return Err("injected tracker outage".into());
            }
            if state.next_number == 0 {
                state.next_number = 1;
            }
            let issue = RemoteIssue {
                number: state.next_number,
                title,
                body: Some(body),
                state: "open".into(),
            };
            state.next_number += 1;
            state.issues.push(issue.clone());
            Ok(issue)
        })
    }

    fn edit_issue(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        edit: IssueEdit,
    ) -> TrackerFuture<'_, RemoteIssue> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let mut state = state.lock().expect("tracker lock");
            state.edit_calls += 1;
            if state.fail_mutations {
                return Err("injected tracker outage".into());
            }
            let issue = state
                .issues
                .iter_mut()
                .find(|i| i.number == number)
                .ok_or_else(|| format!("no issue #{number}"))?;
            if let Some(body) = edit.body {
                issue.body = Some(body);
            }
            if let Some(new_state) = edit.state {
                issue.state = new_state;
            }
            Ok(issue.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_sequential_numbers() {
        let tracker = MemoryTracker::new();
        let first = tracker.create_issue("acme", "widgets", "A", "a").await.unwrap();
        let second = tracker.create_issue("acme", "widgets", "B", "b").await.unwrap();

        assert_eq!(first.number, 1);
        assert_eq!(second.number, 2);
        assert_eq!(tracker.mutating_calls(), 2);
    }

    #[tokio::test]
    async fn edit_applies_partial_changes() {
        let tracker = MemoryTracker::with_issues(vec![RemoteIssue {
            number: 5,
            title: "T".into(),
            body: Some("old".into()),
            state: "open".into(),
        }]);

        let edit = IssueEdit { body: None, state: Some("closed".into()) };
        let edited = tracker.edit_issue("acme", "widgets", 5, edit).await.unwrap();

        assert_eq!(edited.body_text(), "old");
        assert_eq!(edited.state, "closed");
    }

    #[tokio::test]
    async fn injected_outage_fails_mutations_only() {
        let tracker = MemoryTracker::new();
        tracker.set_fail_mutations(true);

        assert!(tracker.list_issues("acme", "widgets").await.is_ok());
        assert!(tracker.create_issue("acme", "widgets", "T", "D").await.is_err());
    }
}
