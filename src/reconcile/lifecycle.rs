//! Finalizer lifecycle: attach on first observation, tear down on delete.
//!
//! A record moves `Active` -> `Terminating` -> gone. The finalizer is only
//! removed after every matching remote issue has been closed, so remote
//! cleanup is guaranteed before the store erases the record.

use tracing::info;

use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::ports::tracker::IssueEdit;
use crate::record::{IssueRecord, FINALIZER};
use crate::repo::RepoRef;

/// Attaches the finalizer and persists the record if not yet present.
///
/// Returns the stored record (with its bumped resource version) so later
/// writes in the same pass do not conflict with our own update.
///
/// # Errors
///
/// Returns a store error when persisting the marker fails; the pass aborts
/// and is retried on the next trigger.
pub fn ensure_finalizer(ctx: &ServiceContext, record: IssueRecord) -> Result<IssueRecord> {
    if record.has_finalizer() {
        return Ok(record);
    }
    let mut next = record;
    next.metadata.finalizers.push(FINALIZER.to_string());
    let stored = ctx.store.update(&next)?;
    info!(record = %stored.metadata.name, "attached finalizer");
    Ok(stored)
}

/// Tears down a terminating record: closes every open remote issue whose
/// title matches, then removes the finalizer so the store can erase it.
///
/// # Errors
///
/// Returns [`Error::Upstream`] if any close fails; the finalizer stays
/// attached and the whole teardown re-runs on the next trigger. Closes
/// already performed are idempotent on retry (a closed issue is skipped).
pub async fn finalize(ctx: &ServiceContext, record: &IssueRecord) -> Result<()> {
    let repo = RepoRef::parse(&record.spec.repo)?;

    let issues = ctx
        .tracker
        .list_issues(&repo.owner, &repo.name)
        .await
        .map_err(|e| Error::upstream("listing issues for teardown", e))?;

    for issue in issues.iter().filter(|i| i.title == record.spec.title && i.state != "closed") {
        let edit = IssueEdit { body: None, state: Some("closed".to_string()) };
        ctx.tracker
            .edit_issue(&repo.owner, &repo.name, issue.number, edit)
            .await
            .map_err(|e| Error::upstream("closing issue", e))?;
        info!(record = %record.metadata.name, number = issue.number, "closed issue");
    }

    let mut released = record.clone();
    released.metadata.finalizers.retain(|f| f != FINALIZER);
    ctx.store.update(&released)?;
    info!(record = %record.metadata.name, "removed finalizer");
    Ok(())
}
