//! Schema validation command.
//!
//! Runs the load, merge and validation stages and stops there: findings
//! are rendered as a table, warnings are surfaced, and the exit status
//! reflects whether any pass produced errors. Nothing is written.
//!
//! ## Usage
//!
//! ```bash
//! mkmig validate
//! ```

use crate::commands::load_project_schema;
use crate::libs::{config::Config, messages::Message};
use crate::msg_success;
use anyhow::Result;

/// Executes the validation command.
///
/// # Returns
///
/// Returns `Ok(())` when the schema validates; validation errors
/// propagate as a non-zero exit after the finding table is rendered.
pub fn cmd() -> Result<()> {
    let config = Config::read()?;
    load_project_schema(&config)?;
    msg_success!(Message::ValidationPassed);
    Ok(())
}
