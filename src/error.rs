//! Error types for the reconciliation engine.

use thiserror::Error;

/// Errors surfaced by the record store port.
///
/// Kept separate from [`Error`] so store adapters stay independent of the
/// reconciler; the engine wraps these via `Error::Store`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the requested name.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A write carried a stale resource version.
    #[error("conflicting write for record '{0}': resource version is stale")]
    Conflict(String),

    /// The underlying storage failed.
    #[error("record storage failed: {0}")]
    Io(String),
}

/// Errors produced by a reconcile pass or controller startup.
#[derive(Debug, Error)]
pub enum Error {
    /// The record's repository URL is malformed or points outside GitHub.
    ///
    /// Not retried; the record must be corrected by its owner.
    #[error("invalid repository URL '{url}': {reason}")]
    InvalidRepoUrl {
        /// The offending URL as written in the record.
        url: String,
        /// What made the URL unacceptable.
        reason: String,
    },

    /// The credential environment variable is unset or empty.
    ///
    /// Fatal to controller startup; no reconcile pass runs without a token.
    #[error("credential not found: set the {0} environment variable")]
    MissingCredential(&'static str),

    /// A transport or API failure from the issue tracker.
    ///
    /// Transient; the pass aborts with no local state committed and is
    /// retried on the next trigger.
    #[error("issue tracker request failed while {context}: {source}")]
    Upstream {
        /// The operation that was in flight.
        context: String,
        /// The underlying transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A status write kept conflicting after re-fetching and reapplying.
    #[error("status write for record '{0}' conflicted repeatedly")]
    StatusConflict(String),

    /// A record store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Wraps a boxed tracker error with the operation it interrupted.
    #[must_use]
    pub fn upstream(
        context: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Upstream { context: context.into(), source }
    }
}

/// Convenience result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_keeps_context_and_cause() {
        let err = Error::upstream("listing issues", "connection reset".into());
        let message = err.to_string();
        assert!(message.contains("listing issues"));
        assert!(message.contains("connection reset"));
    }

    #[test]
    fn store_error_converts() {
        let err = Error::from(StoreError::Conflict("demo".into()));
        assert!(matches!(err, Error::Store(StoreError::Conflict(_))));
    }
}
