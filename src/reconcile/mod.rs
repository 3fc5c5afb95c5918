//! The reconciliation engine.
//!
//! One [`Reconciler`] serves every record; each pass re-reads ground truth
//! from both the record store and the tracker, decides, and converges. The
//! engine never caches remote state across passes.

pub mod lifecycle;
pub mod upsert;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::RESYNC_INTERVAL;
use crate::context::ServiceContext;
use crate::error::{Error, Result, StoreError};
use crate::ports::tracker::RemoteIssue;
use crate::record::{upsert_condition, Condition, ConditionStatus, IssueRecord};
use crate::repo::RepoRef;

/// Condition type tracking whether the remote issue is open.
pub const OPEN_CONDITION: &str = "Open";

/// Attempts per pass to land a status write before giving up.
const STATUS_WRITE_ATTEMPTS: usize = 3;

/// Boxed future type alias used by [`Reconcile`] to keep the trait
/// dyn-compatible.
pub type ReconcileFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<Duration>>> + Send + 'a>>;

/// The capability contract a controller framework drives.
///
/// One method: run a single pass for one record identity, returning how
/// long until a steady-state follow-up is wanted (`None` for no requeue).
pub trait Reconcile: Send + Sync {
    /// Runs one reconcile pass for the named record.
    fn reconcile_once(&self, name: &str) -> ReconcileFuture<'_>;
}

/// Reconciles declarative issue records against the remote tracker.
pub struct Reconciler<'a> {
    ctx: &'a ServiceContext,
    resync_interval: Duration,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler over the given context with the default resync
    /// interval.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx, resync_interval: RESYNC_INTERVAL }
    }

    /// Overrides the steady-state resync interval.
    #[must_use]
    pub fn with_resync_interval(mut self, interval: Duration) -> Self {
        self.resync_interval = interval;
        self
    }

    /// One pass: fetch, branch on lifecycle, converge, project status.
    ///
    /// # Errors
    ///
    /// Propagates every component failure untouched in kind: invalid repo
    /// URLs, upstream tracker failures, store conflicts. The caller owns
    /// retry timing.
    pub async fn run(&self, name: &str) -> Result<Option<Duration>> {
        let Some(record) = self.ctx.store.get(name)? else {
            // Deleted and fully cleaned up already.
            debug!(record = name, "record absent, nothing to reconcile");
            return Ok(None);
        };

        if record.is_terminating() {
            if record.has_finalizer() {
                info!(record = name, "record terminating, tearing down remote issue");
                lifecycle::finalize(self.ctx, &record).await?;
            }
            return Ok(None);
        }

        let record = lifecycle::ensure_finalizer(self.ctx, record)?;
        let repo = RepoRef::parse(&record.spec.repo)?;
        let issue = upsert::apply(self.ctx.tracker.as_ref(), &repo, &record.spec).await?;
        self.write_open_condition(&record, &issue)?;

        debug!(record = name, issue = issue.number, state = %issue.state, "reconciled");
        Ok(Some(self.resync_interval))
    }

    /// Projects the remote issue state into the `Open` condition.
    ///
    /// Conflicting writes are retried by re-fetching the record and
    /// reapplying the condition; after [`STATUS_WRITE_ATTEMPTS`] failures
    /// the pass surfaces [`Error::StatusConflict`].
    fn write_open_condition(&self, record: &IssueRecord, issue: &RemoteIssue) -> Result<()> {
        let condition = Condition {
            condition_type: OPEN_CONDITION.to_string(),
            status: ConditionStatus::from_remote_state(&issue.state),
            reason: "Reconciled".to_string(),
            message: format!("remote issue #{} is {}", issue.number, issue.state),
            last_transition_time: self.ctx.clock.now(),
        };

        let mut current = record.clone();
        for _ in 0..STATUS_WRITE_ATTEMPTS {
            let mut next = current.clone();
            upsert_condition(&mut next.status.conditions, condition.clone());
            match self.ctx.store.update_status(&next) {
                Ok(_) => return Ok(()),
                Err(StoreError::Conflict(_)) => {
                    warn!(record = %record.metadata.name, "status write conflicted, refetching");
                    match self.ctx.store.get(&record.metadata.name)? {
                        Some(fresh) => current = fresh,
                        // Deleted underneath us; nothing left to report on.
                        None => return Ok(()),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::StatusConflict(record.metadata.name.clone()))
    }
}

impl Reconcile for Reconciler<'_> {
    fn reconcile_once(&self, name: &str) -> ReconcileFuture<'_> {
        let name = name.to_string();
        Box::pin(async move { self.run(&name).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryRecordStore, MemoryTracker};
    use crate::ports::store::RecordStore;
    use crate::record::{IssueSpec, IssueStatus, RecordMeta};

    fn seed(store: &MemoryRecordStore, name: &str, repo: &str) {
        let record = IssueRecord {
            metadata: RecordMeta::named(name),
            spec: IssueSpec {
                repo: repo.into(),
                title: "T1".into(),
                description: "D1".into(),
            },
            status: IssueStatus::default(),
        };
        store.create(&record).unwrap();
    }

    #[tokio::test]
    async fn absent_record_is_a_noop_success() {
        let ctx = ServiceContext::memory(MemoryRecordStore::new(), MemoryTracker::new());
        let reconciler = Reconciler::new(&ctx);

        let requeue = reconciler.run("ghost").await.unwrap();
        assert!(requeue.is_none());
    }

    #[tokio::test]
    async fn pass_converges_and_requests_resync() {
        let store = MemoryRecordStore::new();
        let tracker = MemoryTracker::new();
        let ctx = ServiceContext::memory(store.clone(), tracker.clone());
        seed(&store, "demo", "https://github.com/acme/widgets");

        let reconciler = Reconciler::new(&ctx);
        let requeue = reconciler.run("demo").await.unwrap();

        assert_eq!(requeue, Some(RESYNC_INTERVAL));
        let record = store.get("demo").unwrap().unwrap();
        assert!(record.has_finalizer());
        let condition = &record.status.conditions[0];
        assert_eq!(condition.condition_type, OPEN_CONDITION);
        assert_eq!(condition.status, ConditionStatus::True);
        assert_eq!(condition.last_transition_time, ctx.clock.now());
    }

    #[tokio::test]
    async fn invalid_repo_fails_before_any_network_call() {
        let store = MemoryRecordStore::new();
        let tracker = MemoryTracker::new();
        let ctx = ServiceContext::memory(store.clone(), tracker.clone());
        seed(&store, "demo", "/invalid/repo");

        let reconciler = Reconciler::new(&ctx);
        let err = reconciler.run("demo").await.unwrap_err();

        assert!(matches!(err, Error::InvalidRepoUrl { .. }));
        assert_eq!(tracker.list_calls(), 0);
        assert_eq!(tracker.mutating_calls(), 0);
        let record = store.get("demo").unwrap().unwrap();
        assert!(record.status.conditions.is_empty());
    }

    #[tokio::test]
    async fn status_conflict_is_retried_by_refetching() {
        let store = MemoryRecordStore::new();
        let tracker = MemoryTracker::new();
        let ctx = ServiceContext::memory(store.clone(), tracker.clone());
        seed(&store, "demo", "https://github.com/acme/widgets");
        store.inject_status_conflicts(1);

        let reconciler = Reconciler::new(&ctx);
        reconciler.run("demo").await.unwrap();

        let record = store.get("demo").unwrap().unwrap();
        assert_eq!(record.status.conditions.len(), 1);
    }

    #[tokio::test]
    async fn persistent_status_conflict_surfaces() {
        let store = MemoryRecordStore::new();
        let tracker = MemoryTracker::new();
        let ctx = ServiceContext::memory(store.clone(), tracker.clone());
        seed(&store, "demo", "https://github.com/acme/widgets");
        store.inject_status_conflicts(STATUS_WRITE_ATTEMPTS);

        let reconciler = Reconciler::new(&ctx);
        let err = reconciler.run("demo").await.unwrap_err();
        assert!(matches!(err, Error::StatusConflict(_)));
    }

    #[tokio::test]
    async fn terminating_without_finalizer_is_a_noop() {
        let store = MemoryRecordStore::new();
        let tracker = MemoryTracker::new();
        let ctx = ServiceContext::memory(store.clone(), tracker.clone());

        let record = IssueRecord {
            metadata: RecordMeta {
                deletion_timestamp: Some(ctx.clock.now()),
                ..RecordMeta::named("demo")
            },
            spec: IssueSpec {
                repo: "https://github.com/acme/widgets".into(),
                title: "T1".into(),
                description: "D1".into(),
            },
            status: IssueStatus::default(),
        };
        store.create(&record).unwrap();

        let reconciler = Reconciler::new(&ctx);
        let requeue = reconciler.run("demo").await.unwrap();
        assert!(requeue.is_none());
        assert_eq!(tracker.list_calls(), 0);
    }

    #[tokio::test]
    async fn trait_object_dispatch_works() {
        let store = MemoryRecordStore::new();
        let ctx = ServiceContext::memory(store.clone(), MemoryTracker::new());
        seed(&store, "demo", "https://github.com/acme/widgets");

        let reconciler = Reconciler::new(&ctx);
        let dynamic: &dyn Reconcile = &reconciler;
        let requeue = dynamic.reconcile_once("demo").await.unwrap();
        assert!(requeue.is_some());
    }
}
