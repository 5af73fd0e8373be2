//! Project initialization command.
//!
//! Provides an interactive setup wizard that prepares a project for
//! migration generation: configuration file, migrations directory, and a
//! starter schema document seeded with the per-dialect defaults table.
//!
//! ## Features
//!
//! - **Interactive Setup**: dialect, layout and numbering choices
//! - **Scaffolding**: creates the migrations directory and a starter
//!   `schema.yaml` when they do not exist
//! - **Reset Capability**: `--delete` removes the configuration file
//!
//! ## Usage
//!
//! ```bash
//! # Run interactive setup wizard
//! mkmig init
//!
//! # Reset configuration (remove existing settings)
//! mkmig init --delete
//! ```

use crate::libs::{config::Config, messages::Message};
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;
use std::fs;

/// Starter schema written by `mkmig init`.
///
/// Ships the complete symbolic-default vocabulary for every supported
/// dialect; the boolean and null symbols are quoted because bare YAML
/// would read them as scalars rather than keys.
const SCHEMA_TEMPLATE: &str = r#"database:
  name: myapp
  version: "1.0"

defaults:
  postgresql:
    now: CURRENT_TIMESTAMP
    today: CURRENT_DATE
    current_time: CURRENT_TIME
    new_uuid: gen_random_uuid()
    blank: "''"
    zero: "0"
    "true": "true"
    "false": "false"
    "null": "NULL"
    array: "'[]'"
    object: "'{}'"
  mysql:
    now: CURRENT_TIMESTAMP
    today: (CURDATE())
    current_time: (CURTIME())
    new_uuid: (UUID())
    blank: "''"
    zero: "0"
    "true": "1"
    "false": "0"
    "null": "NULL"
    array: ('[]')
    object: ('{}')
  sqlite:
    now: CURRENT_TIMESTAMP
    today: CURRENT_DATE
    current_time: CURRENT_TIME
    new_uuid: (hex(randomblob(16)))
    blank: "''"
    zero: "0"
    "true": "1"
    "false": "0"
    "null": "NULL"
    array: "'[]'"
    object: "'{}'"
  sqlserver:
    now: GETDATE()
    today: CAST(GETDATE() AS DATE)
    current_time: CAST(GETDATE() AS TIME)
    new_uuid: NEWID()
    blank: "''"
    zero: "0"
    "true": "1"
    "false": "0"
    "null": "NULL"
    array: "'[]'"
    object: "'{}'"

tables: []
# Example:
# tables:
#   - name: users
#     fields:
#       - name: id
#         type: uuid
#         primary_key: true
#         default: new_uuid
#       - name: email
#         type: varchar
#         length: 255
#         nullable: false
#     indexes:
#       - name: idx_users_email
#         fields: [email]
#         unique: true
"#;

/// Command-line arguments for the initialization command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Remove existing configuration instead of creating new one
    ///
    /// Deletes the current configuration file, resetting the project to
    /// its unconfigured state. Schema and migration files are untouched.
    #[arg(short, long)]
    delete: bool,
}

/// Executes the initialization command.
///
/// Runs the configuration wizard and scaffolds the project layout, or
/// removes the configuration when `--delete` is used.
///
/// # Arguments
///
/// * `init_args` - Parsed command-line arguments containing options
///
/// # Returns
///
/// Returns `Ok(())` on successful setup, or an error if the setup fails.
pub fn cmd(init_args: InitArgs) -> Result<()> {
    // Handle deletion mode - exit early after cleanup
    if init_args.delete {
        if Config::delete()? {
            msg_info!(Message::ConfigDeleted);
        } else {
            msg_info!(Message::ConfigNotFound);
        }
        return Ok(());
    }

    // Run interactive configuration wizard and persist the choices
    let config = Config::init()?;
    config.save()?;
    msg_success!(Message::ConfigSaved);

    // Scaffold the migrations directory for the first run
    if !config.migrations_dir.exists() {
        fs::create_dir_all(&config.migrations_dir)?;
        msg_info!(Message::MigrationsDirCreated(config.migrations_dir.display().to_string()));
    }

    // Seed a starter schema unless the project already has one
    if config.schema_file.exists() {
        msg_info!(Message::SchemaFileExists(config.schema_file.display().to_string()));
    } else {
        fs::write(&config.schema_file, SCHEMA_TEMPLATE)?;
        msg_success!(Message::SchemaFileCreated(config.schema_file.display().to_string()));
    }

    Ok(())
}
