//! Command dispatch and handlers.

pub mod apply;
pub mod delete;
pub mod list;
pub mod run;

use std::env;
use std::path::PathBuf;

use crate::cli::{Cli, Command};

/// Environment variable overriding the default record store directory.
pub const STORE_VAR: &str = "GHSYNC_STORE";

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let root = store_root(cli.store.clone());
    match &cli.command {
        Command::Run { once } => run::run(&root, *once),
        Command::Apply { file } => apply::run(&root, file),
        Command::Delete { name } => delete::run(&root, name),
        Command::List => list::run(&root),
    }
}

/// Resolves the record store directory: flag, then env, then `.ghsync`.
fn store_root(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        env::var(STORE_VAR).map_or_else(|_| PathBuf::from(".ghsync"), PathBuf::from)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_store_path_wins() {
        let root = store_root(Some(PathBuf::from("/tmp/records")));
        assert_eq!(root, PathBuf::from("/tmp/records"));
    }

    #[test]
    fn default_store_path_is_relative() {
        // Only meaningful when GHSYNC_STORE is unset in the test environment.
        if env::var(STORE_VAR).is_err() {
            assert_eq!(store_root(None), PathBuf::from(".ghsync"));
        }
    }
}
