//! Command-line interface commands for the mkmig application.
//!
//! Contains all CLI command implementations for schema validation,
//! migration generation, and project setup.
//!
//! ## Features
//!
//! - **Core Commands**: Migration generation with check and dry-run modes
//! - **Utility Commands**: Schema validation, pending-change status
//! - **Setup Commands**: Interactive configuration and project scaffolding
//!
//! ## Usage
//!
//! ```bash
//! mkmig init                        # Scaffold configuration and schema
//! mkmig generate                    # Diff the schema and write a migration
//! mkmig generate --check            # Fail when changes are pending
//! mkmig generate --name add_users   # Name the migration explicitly
//! mkmig validate                    # Validate the schema and exit
//! mkmig status                      # Show the pending change plan
//! ```

pub mod generate;
pub mod init;
pub mod status;
pub mod validate;

use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::schema::loader::{FsDocumentSource, SchemaLoader};
use crate::schema::model::Schema;
use crate::schema::validate::Severity;
use crate::schema::{merge, validate as schema_validate, Error};
use crate::{msg_bail_anyhow, msg_debug, msg_warning};
use anyhow::Result;
use clap::{Parser, Subcommand};

/// Defines the main subcommands that the application can execute.
///
/// Each variant corresponds to a specific command with its own argument
/// structure, organized by frequency of use.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Initialize project configuration and scaffolding interactively
    ///
    /// Guides the user through dialect and layout choices, then writes
    /// `mkmig.json`, the migrations directory, and a starter schema.
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),

    /// Generate a migration from the current schema
    ///
    /// Loads and merges all schema documents, diffs against the last
    /// snapshot, and writes a goose-compatible migration file.
    #[command(about = "Generate a migration from schema changes")]
    Generate(generate::GenerateArgs),

    /// Validate the schema without generating anything
    ///
    /// Runs the structural, referential and dialect passes and renders
    /// every finding. Exits non-zero when errors are present.
    #[command(about = "Validate the schema documents")]
    Validate,

    /// Show the snapshot state and the pending change plan
    ///
    /// Read-only: computes the diff against the last snapshot and prints
    /// it as a table without writing any files.
    #[command(about = "Show pending schema changes")]
    Status,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parses the command line and dispatches to the selected command.
    pub fn menu() -> Result<()> {
        let cli = Self::parse();

        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Generate(args) => generate::cmd(args),
            Commands::Validate => validate::cmd(),
            Commands::Status => status::cmd(),
        }
    }
}

/// Loads, merges and validates the project schema.
///
/// The shared front half of every pipeline command: resolves the root
/// document and its includes, surfaces loader and validation warnings,
/// renders validation errors as a table, and returns the merged canonical
/// schema.
pub(crate) fn load_project_schema(config: &Config) -> Result<Schema> {
    let source = FsDocumentSource::new(".");
    let mut loader = SchemaLoader::new(&source);

    let root = config.schema_file.display().to_string();
    let schemas = loader.load("", &root)?;
    for warning in loader.warnings() {
        msg_warning!(Message::LoadWarning(warning.clone()));
    }
    msg_debug!(Message::SchemasLoaded(schemas.len()));

    let merged = merge::merge(&schemas)?;

    match schema_validate::validate(&merged, config.dialect) {
        Ok(warnings) => {
            for finding in &warnings {
                msg_warning!(Message::ValidationWarning(finding.to_string()));
            }
        }
        Err(Error::Validation(findings)) => {
            View::findings(&findings)?;
            let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
            msg_bail_anyhow!(Message::ValidationFailed(errors));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(merged)
}
