//! Display implementation for mkmig application messages.
//!
//! Converts each [`Message`] variant into the human-readable text shown in
//! the terminal. Keeping every user-facing string in one match arm list
//! gives the application a single source of truth for wording: parameters
//! are interpolated type-safely, and a new variant cannot ship without an
//! explicit formatting decision here.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigWizardHeader => "mkmig configuration".to_string(),
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed.".to_string(),
            Message::ConfigNotFound => "No configuration file found, nothing to remove.".to_string(),
            Message::PromptDialect => "Target SQL dialect".to_string(),
            Message::PromptSchemaFile => "Root schema document".to_string(),
            Message::PromptMigrationsDir => "Migrations directory".to_string(),
            Message::PromptNumbering => "Migration numbering".to_string(),
            Message::PromptIncludeDown => "Generate down (reverse) sections?".to_string(),
            Message::PromptQuoteIdentifiers => "Quote identifiers in emitted SQL?".to_string(),

            // === SCAFFOLDING MESSAGES ===
            Message::SchemaFileCreated(path) => format!("Created starter schema at {}", path),
            Message::SchemaFileExists(path) => format!("Schema file {} already exists, left untouched.", path),
            Message::MigrationsDirCreated(path) => format!("Created migrations directory {}", path),

            // === PIPELINE MESSAGES ===
            Message::SchemasLoaded(count) => format!("Loaded {} schema document(s)", count),
            Message::LoadWarning(warning) => warning.clone(),
            Message::ValidationWarning(finding) => finding.clone(),
            Message::ValidationPassed => "Schema is valid.".to_string(),
            Message::ValidationFailed(count) => format!("Schema validation failed with {} error(s).", count),
            Message::NoChangesDetected => "No schema changes detected.".to_string(),
            Message::PendingChanges(count) => format!("{} pending change(s)", count),

            // === GENERATION MESSAGES ===
            Message::MigrationCreated(filename) => format!("Migration created: {}", filename),
            Message::SnapshotSaved(path) => format!("Snapshot updated: {}", path),
            Message::DryRunHeader(filename) => format!("Dry run, would write {}:", filename),
            Message::ConfirmDestructive(change) => format!("Destructive change: {}. Emit this statement?", change),
            Message::CheckChangesPending(count) => format!("Check failed: {} change(s) would be generated.", count),
            Message::CheckUpToDate => "Schema matches the last snapshot, nothing to generate.".to_string(),

            // === STATUS MESSAGES ===
            Message::StatusFirstRun => "No snapshot yet; the next run generates the initial migration.".to_string(),
            Message::StatusSnapshot(path) => format!("Snapshot: {}", path),
            Message::PendingChangesHeader => "Pending changes:".to_string(),
        };
        write!(f, "{}", text)
    }
}
