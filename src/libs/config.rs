//! Configuration management for the mkmig application.
//!
//! Configuration lives next to the schema it governs: a single `mkmig.json`
//! in the project root, read at startup and written by the interactive
//! setup wizard. Every option has a default, so a project with no
//! configuration file at all generates PostgreSQL migrations into
//! `migrations/` with the standard prefixes.
//!
//! ## Options
//!
//! - **dialect**: target SQL dialect (`postgresql`, `mysql`, `sqlite`,
//!   `sqlserver`)
//! - **schema_file**: root schema document, default `schema.yaml`
//! - **migrations_dir**: output directory, default `migrations`
//! - **snapshot_filename**: dot-prefixed so the migration runner ignores
//!   it, default `.schema_snapshot.yaml`
//! - **file_prefix**: `sequential` or `timestamp` numbering
//! - **include_down**: emit the reverse section, default true
//! - **review_prefix** / **rejection_prefix**: comment prefixes for
//!   destructive-statement handling
//! - **destructive_operations**: change kinds classified destructive
//! - **silent**: skip confirmation prompts, annotate unconditionally
//! - **quote_identifiers**: quote identifiers in emitted DDL
//! - **default_schema**: namespace for dialects with schema support
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mkmig::libs::config::Config;
//!
//! // Load existing configuration or fall back to defaults
//! let config = Config::read()?;
//!
//! // Run the interactive setup wizard and persist the result
//! Config::init()?.save()?;
//! # anyhow::Ok(())
//! ```

use crate::dialect::Dialect;
use crate::libs::messages::Message;
use crate::migration::destructive::DestructivePolicy;
use crate::migration::numbering::NumberingScheme;
use crate::msg_print;
use crate::schema::diff::ChangeKind;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Configuration file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "mkmig.json";

/// Application configuration, one value per recognized option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Target SQL dialect; selects the emission provider.
    #[serde(default)]
    pub dialect: Dialect,

    /// Root schema document the pipeline starts from.
    #[serde(default = "default_schema_file")]
    pub schema_file: PathBuf,

    /// Directory migration files and the snapshot are written to.
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,

    /// Snapshot filename inside the migrations directory. Dot-prefixed by
    /// default so the migration runner never applies it.
    #[serde(default = "default_snapshot_filename")]
    pub snapshot_filename: String,

    /// Migration numbering discipline.
    #[serde(default)]
    pub file_prefix: NumberingScheme,

    /// Timestamp pattern for the `timestamp` numbering discipline.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Emit the reverse (down) section.
    #[serde(default = "default_true")]
    pub include_down: bool,

    /// Comment prefix placed before destructive statements and every down
    /// statement.
    #[serde(default = "default_review_prefix")]
    pub review_prefix: String,

    /// Comment prefix used when a destructive statement is rejected.
    #[serde(default = "default_rejection_prefix")]
    pub rejection_prefix: String,

    /// Change kinds classified as destructive.
    #[serde(default = "default_destructive_operations")]
    pub destructive_operations: Vec<ChangeKind>,

    /// Suppress confirmation prompts; annotate destructive statements
    /// unconditionally.
    #[serde(default)]
    pub silent: bool,

    /// Quote identifiers in emitted DDL.
    #[serde(default = "default_true")]
    pub quote_identifiers: bool,

    /// Namespace tables live in, for dialects with schema support.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dialect: Dialect::default(),
            schema_file: default_schema_file(),
            migrations_dir: default_migrations_dir(),
            snapshot_filename: default_snapshot_filename(),
            file_prefix: NumberingScheme::default(),
            timestamp_format: default_timestamp_format(),
            include_down: true,
            review_prefix: default_review_prefix(),
            rejection_prefix: default_rejection_prefix(),
            destructive_operations: default_destructive_operations(),
            silent: false,
            quote_identifiers: true,
            default_schema: None,
        }
    }
}

impl Config {
    /// Loads `mkmig.json` from the working directory, falling back to the
    /// defaults when the file does not exist.
    pub fn read() -> Result<Config> {
        Self::read_from(Path::new(CONFIG_FILE_NAME))
    }

    /// Loads configuration from an explicit path.
    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Persists the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        self.save_to(Path::new(CONFIG_FILE_NAME))
    }

    /// Persists the configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Runs the interactive setup wizard.
    ///
    /// Existing configuration values become the wizard's defaults, so
    /// rerunning the wizard edits rather than resets.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        msg_print!(Message::ConfigWizardHeader, true);

        let dialect_index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptDialect.to_string())
            .items(&Dialect::ALL.map(|d| d.key()))
            .default(Dialect::ALL.iter().position(|d| *d == config.dialect).unwrap_or(0))
            .interact()?;
        config.dialect = Dialect::ALL[dialect_index];

        let schema_file: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSchemaFile.to_string())
            .default(config.schema_file.display().to_string())
            .interact_text()?;
        config.schema_file = PathBuf::from(schema_file);

        let migrations_dir: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptMigrationsDir.to_string())
            .default(config.migrations_dir.display().to_string())
            .interact_text()?;
        config.migrations_dir = PathBuf::from(migrations_dir);

        let schemes = [NumberingScheme::Sequential, NumberingScheme::Timestamp];
        let scheme_index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptNumbering.to_string())
            .items(&schemes.map(|s| s.to_string()))
            .default(schemes.iter().position(|s| *s == config.file_prefix).unwrap_or(0))
            .interact()?;
        config.file_prefix = schemes[scheme_index];

        config.include_down = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptIncludeDown.to_string())
            .default(config.include_down)
            .interact()?;

        config.quote_identifiers = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptQuoteIdentifiers.to_string())
            .default(config.quote_identifiers)
            .interact()?;

        Ok(config)
    }

    /// Removes the configuration file, if present.
    pub fn delete() -> Result<bool> {
        let path = Path::new(CONFIG_FILE_NAME);
        if path.exists() {
            fs::remove_file(path)?;
            return Ok(true);
        }
        Ok(false)
    }
}

fn default_schema_file() -> PathBuf {
    PathBuf::from("schema.yaml")
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_snapshot_filename() -> String {
    ".schema_snapshot.yaml".to_string()
}

fn default_timestamp_format() -> String {
    "%Y%m%d%H%M%S".to_string()
}

fn default_review_prefix() -> String {
    "-- REVIEW: ".to_string()
}

fn default_rejection_prefix() -> String {
    "-- REJECTED: ".to_string()
}

fn default_destructive_operations() -> Vec<ChangeKind> {
    DestructivePolicy::default_kinds()
}

fn default_true() -> bool {
    true
}
