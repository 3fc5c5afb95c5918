//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `ghsync`.
#[derive(Debug, Parser)]
#[command(name = "ghsync", version, about = "Reconcile declarative issue records against GitHub")]
pub struct Cli {
    /// Directory holding record files (defaults to $GHSYNC_STORE or .ghsync).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the reconciliation controller.
    Run {
        /// Perform a single sweep over all records and exit.
        #[arg(long)]
        once: bool,
    },
    /// Create or update a record from a YAML manifest.
    Apply {
        /// Path to the record manifest.
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Request deletion of a record.
    Delete {
        /// Name of the record to delete.
        name: String,
    },
    /// List records and their observed issue state.
    List,
}
