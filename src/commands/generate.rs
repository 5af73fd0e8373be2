//! Migration generation command: the full schema pipeline.
//!
//! Loads and merges every schema document, validates the result, analyzes
//! dependencies, diffs against the last snapshot, and writes one numbered
//! migration file plus the updated snapshot. Check and dry-run modes stop
//! short of writing anything.
//!
//! ## Features
//!
//! - **Check Mode**: `--check` exits non-zero when changes are pending
//! - **Dry Run**: `--dry-run` prints the migration instead of writing it
//! - **Naming**: `--name` overrides the derived filename slug
//! - **Silent Mode**: `--silent` skips destructive-change confirmations
//!
//! ## Usage
//!
//! ```bash
//! mkmig generate
//! mkmig generate --name create_billing --silent
//! mkmig generate --check    # CI guard against un-generated changes
//! ```

use crate::commands::load_project_schema;
use crate::libs::{config::Config, messages::Message};
use crate::migration::writer::MigrationWriter;
use crate::schema::analyze::analyze;
use crate::schema::diff::{diff, has_changes};
use crate::schema::snapshot::SnapshotStore;
use crate::{msg_bail_anyhow, msg_info, msg_print, msg_success};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

/// Command-line arguments for the generation command.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Explicit migration name used as the filename slug
    #[arg(short, long)]
    name: Option<String>,

    /// Exit non-zero when changes are pending, without writing files
    #[arg(long)]
    check: bool,

    /// Print the migration to stdout instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Skip confirmation prompts for destructive statements
    #[arg(short, long)]
    silent: bool,
}

/// Executes the generation command.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments containing options
///
/// # Returns
///
/// Returns `Ok(())` when a migration was written or no changes were
/// pending; errors carry a non-zero exit status.
pub fn cmd(args: GenerateArgs) -> Result<()> {
    let mut config = Config::read()?;
    if args.silent {
        config.silent = true;
    }

    let merged = load_project_schema(&config)?;
    let analysis = analyze(&merged);

    let store = SnapshotStore::new(&config.migrations_dir, &config.snapshot_filename);
    let old_schema = store.load()?;
    let old_analysis = old_schema.as_ref().map(analyze);

    let changes = diff(old_analysis.as_ref(), &analysis);

    if args.check {
        if has_changes(&changes) {
            // The non-zero exit is the contract here; CI keys off it.
            msg_bail_anyhow!(Message::CheckChangesPending(changes.len()));
        }
        msg_success!(Message::CheckUpToDate);
        return Ok(());
    }

    if !has_changes(&changes) {
        msg_info!(Message::NoChangesDetected);
        return Ok(());
    }
    msg_info!(Message::PendingChanges(changes.len()));

    let mut writer = MigrationWriter::new(&config);
    if !config.silent && !args.dry_run {
        writer = writer.with_confirm(|description| {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::ConfirmDestructive(description.to_string()).to_string())
                .default(true)
                .interact()
                .unwrap_or(true)
        });
    }

    if args.dry_run {
        let migration = writer.render(&changes, old_analysis.as_ref(), &analysis, args.name.as_deref())?;
        msg_print!(Message::DryRunHeader(migration.filename.clone()), true);
        println!("{}", migration.content());
        return Ok(());
    }

    let migration = writer.write(&changes, old_analysis.as_ref(), &analysis, args.name.as_deref())?;
    store.save(&analysis.schema)?;

    msg_success!(Message::MigrationCreated(migration.filename.clone()));
    msg_info!(Message::SnapshotSaved(store.path().display().to_string()));

    Ok(())
}
