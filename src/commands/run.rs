//! `ghsync run` command: the controller loop.

use std::path::Path;
use std::time::Duration;

use tracing::{error, info};

use crate::config::Config;
use crate::context::ServiceContext;
use crate::reconcile::{Reconcile, Reconciler};

/// Execute the `run` command.
///
/// Sweeps every stored record through a reconcile pass, then sleeps until
/// the earliest requested resync and sweeps again. With `once`, performs a
/// single sweep and exits (cron-style operation).
///
/// A failing pass is logged and does not stop the loop; the record is
/// retried on the next sweep. Only startup misconfiguration (missing
/// credential) aborts.
///
/// # Errors
///
/// Returns an error string when configuration or context construction
/// fails, or when the async runtime cannot be built.
pub fn run(store_root: &Path, once: bool) -> Result<(), String> {
    let config = Config::from_env(store_root).map_err(|e| e.to_string())?;
    let ctx = ServiceContext::live(&config).map_err(|e| e.to_string())?;
    let reconciler = Reconciler::new(&ctx);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to build async runtime: {e}"))?;

    info!(store = %store_root.display(), "controller started");
    loop {
        let names = ctx.store.list().map_err(|e| format!("Failed to list records: {e}"))?;
        let mut next_sweep: Option<Duration> = None;

        for name in names {
            match runtime.block_on(reconciler.reconcile_once(&name)) {
                Ok(Some(requeue)) => {
                    next_sweep = Some(next_sweep.map_or(requeue, |d| d.min(requeue)));
                }
                Ok(None) => {}
                Err(e) => {
                    // Transient failures are retried on the next sweep.
                    error!(record = %name, error = %e, "reconcile pass failed");
                }
            }
        }

        if once {
            return Ok(());
        }
        std::thread::sleep(next_sweep.unwrap_or(config.resync_interval));
    }
}
