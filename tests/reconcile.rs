//! End-to-end reconciliation scenarios over in-memory adapters.

use chrono::Utc;

use ghsync::adapters::memory::{MemoryRecordStore, MemoryTracker};
use ghsync::context::ServiceContext;
use ghsync::error::Error;
use ghsync::ports::store::RecordStore;
use ghsync::ports::tracker::RemoteIssue;
use ghsync::reconcile::{Reconciler, OPEN_CONDITION};
use ghsync::record::{ConditionStatus, IssueRecord, IssueSpec, IssueStatus, RecordMeta};

fn seed_record(store: &MemoryRecordStore, name: &str, repo: &str, title: &str, description: &str) {
    let record = IssueRecord {
        metadata: RecordMeta::named(name),
        spec: IssueSpec { repo: repo.into(), title: title.into(), description: description.into() },
        status: IssueStatus::default(),
    };
    store.create(&record).unwrap();
}

fn open_condition(record: &IssueRecord) -> &ghsync::record::Condition {
    record
        .status
        .conditions
        .iter()
        .find(|c| c.condition_type == OPEN_CONDITION)
        .expect("open condition present")
}

#[tokio::test]
async fn scenario_a_new_record_creates_open_issue() {
    let store = MemoryRecordStore::new();
    let tracker = MemoryTracker::new();
    let ctx = ServiceContext::memory(store.clone(), tracker.clone());
    seed_record(&store, "demo", "https://github.com/acme/widgets", "T1", "D1");

    let reconciler = Reconciler::new(&ctx);
    let requeue = reconciler.run("demo").await.unwrap();
    assert!(requeue.is_some());

    let issues = tracker.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].title, "T1");
    assert_eq!(issues[0].body_text(), "D1");
    assert_eq!(issues[0].state, "open");

    let record = store.get("demo").unwrap().unwrap();
    assert!(record.has_finalizer());
    assert_eq!(open_condition(&record).status, ConditionStatus::True);
}

#[tokio::test]
async fn scenario_b_description_change_edits_body_only() {
    let store = MemoryRecordStore::new();
    let tracker = MemoryTracker::new();
    let ctx = ServiceContext::memory(store.clone(), tracker.clone());
    seed_record(&store, "demo", "https://github.com/acme/widgets", "T1", "D1");

    let reconciler = Reconciler::new(&ctx);
    reconciler.run("demo").await.unwrap();
    let number = tracker.issues()[0].number;
    let calls_after_create = tracker.mutating_calls();

    let mut record = store.get("demo").unwrap().unwrap();
    record.spec.description = "D2".into();
    store.update(&record).unwrap();

    reconciler.run("demo").await.unwrap();

    let issues = tracker.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].number, number);
    assert_eq!(issues[0].title, "T1");
    assert_eq!(issues[0].body_text(), "D2");
    assert_eq!(tracker.mutating_calls(), calls_after_create + 1);
}

#[tokio::test]
async fn steady_state_passes_make_no_mutating_calls() {
    let store = MemoryRecordStore::new();
    let tracker = MemoryTracker::new();
    let ctx = ServiceContext::memory(store.clone(), tracker.clone());
    seed_record(&store, "demo", "https://github.com/acme/widgets", "T1", "D1");

    let reconciler = Reconciler::new(&ctx);
    reconciler.run("demo").await.unwrap();
    reconciler.run("demo").await.unwrap();
    reconciler.run("demo").await.unwrap();

    assert_eq!(tracker.mutating_calls(), 1);
}

#[tokio::test]
async fn scenario_c_deletion_closes_issue_and_erases_record() {
    let store = MemoryRecordStore::new();
    let tracker = MemoryTracker::new();
    let ctx = ServiceContext::memory(store.clone(), tracker.clone());
    seed_record(&store, "demo", "https://github.com/acme/widgets", "T1", "D1");

    let reconciler = Reconciler::new(&ctx);
    reconciler.run("demo").await.unwrap();

    store.mark_deleted("demo", Utc::now()).unwrap();
    assert!(store.get("demo").unwrap().is_some(), "finalizer keeps the record");

    let requeue = reconciler.run("demo").await.unwrap();
    assert!(requeue.is_none(), "no resync after teardown");

    assert_eq!(tracker.issues()[0].state, "closed");
    assert!(store.get("demo").unwrap().is_none());
}

#[tokio::test]
async fn scenario_c_failed_close_keeps_record_retriable() {
    let store = MemoryRecordStore::new();
    let tracker = MemoryTracker::new();
    let ctx = ServiceContext::memory(store.clone(), tracker.clone());
    seed_record(&store, "demo", "https://github.com/acme/widgets", "T1", "D1");

    let reconciler = Reconciler::new(&ctx);
    reconciler.run("demo").await.unwrap();
    store.mark_deleted("demo", Utc::now()).unwrap();

    tracker.set_fail_mutations(true);
    let err = reconciler.run("demo").await.unwrap_err();
    assert!(matches!(err, Error::Upstream { .. }));
    assert!(store.get("demo").unwrap().unwrap().has_finalizer());
    assert_eq!(tracker.issues()[0].state, "open");

    // Re-delivery of the deletion event after the outage clears.
    tracker.set_fail_mutations(false);
    reconciler.run("demo").await.unwrap();
    assert_eq!(tracker.issues()[0].state, "closed");
    assert!(store.get("demo").unwrap().is_none());
}

#[tokio::test]
async fn scenario_d_invalid_repo_fails_without_network_or_status() {
    let store = MemoryRecordStore::new();
    let tracker = MemoryTracker::new();
    let ctx = ServiceContext::memory(store.clone(), tracker.clone());
    seed_record(&store, "demo", "/invalid/repo", "T1", "D1");

    let reconciler = Reconciler::new(&ctx);
    let err = reconciler.run("demo").await.unwrap_err();

    assert!(matches!(err, Error::InvalidRepoUrl { .. }));
    assert_eq!(tracker.list_calls(), 0);
    assert_eq!(tracker.mutating_calls(), 0);
    assert!(store.get("demo").unwrap().unwrap().status.conditions.is_empty());
}

#[tokio::test]
async fn adopts_existing_issue_with_matching_title() {
    let store = MemoryRecordStore::new();
    let tracker = MemoryTracker::with_issues(vec![RemoteIssue {
        number: 41,
        title: "T1".into(),
        body: Some("D1".into()),
        state: "open".into(),
    }]);
    let ctx = ServiceContext::memory(store.clone(), tracker.clone());
    seed_record(&store, "demo", "https://github.com/acme/widgets", "T1", "D1");

    let reconciler = Reconciler::new(&ctx);
    reconciler.run("demo").await.unwrap();

    assert_eq!(tracker.mutating_calls(), 0, "already converged");
    let record = store.get("demo").unwrap().unwrap();
    assert_eq!(open_condition(&record).status, ConditionStatus::True);
}

#[tokio::test]
async fn externally_closed_issue_observes_as_false() {
    let store = MemoryRecordStore::new();
    let tracker = MemoryTracker::with_issues(vec![RemoteIssue {
        number: 8,
        title: "T1".into(),
        body: Some("D1".into()),
        state: "closed".into(),
    }]);
    let ctx = ServiceContext::memory(store.clone(), tracker.clone());
    seed_record(&store, "demo", "https://github.com/acme/widgets", "T1", "D1");

    let reconciler = Reconciler::new(&ctx);
    reconciler.run("demo").await.unwrap();

    let record = store.get("demo").unwrap().unwrap();
    assert_eq!(open_condition(&record).status, ConditionStatus::False);
}
