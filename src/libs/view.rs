//! Console table rendering for the mkmig application.
//!
//! The presentation layer for everything the tool shows as structured
//! data: validation findings, pending change plans, and the summary of a
//! generated migration. Business logic stays in the pipeline modules; this
//! module only formats.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mkmig::libs::view::View;
//!
//! # let findings = Vec::new();
//! View::findings(&findings)?;
//! # anyhow::Ok(())
//! ```

use crate::migration::destructive::DestructivePolicy;
use crate::schema::diff::Change;
use crate::schema::validate::Finding;
use anyhow::Result;
use prettytable::{format, row, Table};

/// A utility struct for rendering application data to the console.
///
/// All methods are static; the struct is a namespace, not a value.
pub struct View {}

impl View {
    /// Displays validation findings with severity and schema location.
    pub fn findings(findings: &[Finding]) -> Result<()> {
        if findings.is_empty() {
            return Ok(());
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row!["SEVERITY", "LOCATION", "MESSAGE"]);

        for finding in findings {
            table.add_row(row![finding.severity, finding.location, finding.message]);
        }

        table.printstd();
        Ok(())
    }

    /// Displays the pending change plan with destructive classification.
    pub fn changes(changes: &[Change], policy: &DestructivePolicy) -> Result<()> {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row!["#", "KIND", "TABLE", "CHANGE", "DESTRUCTIVE"]);

        for (index, change) in changes.iter().enumerate() {
            let destructive = if policy.is_destructive(change) { "yes" } else { "" };
            table.add_row(row![
                index + 1,         // Human-friendly 1-based numbering
                change.kind(),     // Configuration vocabulary kind
                change.table(),    // Affected table
                change.describe(), // Short description
                destructive       // Marked when the configured set matches
            ]);
        }

        table.printstd();
        Ok(())
    }
}
