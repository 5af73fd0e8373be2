//! Pending-change status command.
//!
//! Read-only view of what `generate` would do: loads the schema, diffs it
//! against the last snapshot, and renders the pending change plan with
//! destructive classification. No files are written, and the exit status
//! is always zero for a clean run regardless of pending changes.
//!
//! ## Usage
//!
//! ```bash
//! mkmig status
//! ```

use crate::commands::load_project_schema;
use crate::libs::{config::Config, messages::Message, view::View};
use crate::migration::destructive::DestructivePolicy;
use crate::schema::analyze::analyze;
use crate::schema::diff::{diff, has_changes};
use crate::schema::snapshot::SnapshotStore;
use crate::{msg_info, msg_print};
use anyhow::Result;

/// Executes the status command.
///
/// # Returns
///
/// Returns `Ok(())` after rendering the snapshot state and the pending
/// change plan.
pub fn cmd() -> Result<()> {
    let config = Config::read()?;

    let merged = load_project_schema(&config)?;
    let analysis = analyze(&merged);

    let store = SnapshotStore::new(&config.migrations_dir, &config.snapshot_filename);
    let old_schema = store.load()?;
    match &old_schema {
        Some(_) => msg_info!(Message::StatusSnapshot(store.path().display().to_string())),
        None => msg_info!(Message::StatusFirstRun),
    }

    let old_analysis = old_schema.as_ref().map(analyze);
    let changes = diff(old_analysis.as_ref(), &analysis);

    if !has_changes(&changes) {
        msg_info!(Message::NoChangesDetected);
        return Ok(());
    }

    msg_print!(Message::PendingChangesHeader, true);
    let policy = DestructivePolicy::new(config.destructive_operations.iter().copied(), config.silent);
    View::changes(&changes, &policy)?;
    msg_info!(Message::PendingChanges(changes.len()));

    Ok(())
}
