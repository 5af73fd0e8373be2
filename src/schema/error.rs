//! Error taxonomy for the schema pipeline.
//!
//! Every fatal condition the pipeline can hit has one variant here; the
//! command layer converts them into user-facing messages and a non-zero
//! exit status. Validation is the only accumulating case: a whole pass is
//! collected before the pipeline aborts, so one run surfaces every problem
//! of that pass. Everything else fails fast. Dialect limitations are not
//! errors at all; unsupported DDL is emitted as a commented placeholder.

use crate::schema::validate::Finding;
use thiserror::Error;

/// Fatal errors of the schema pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// A schema document is unreadable or malformed.
    #[error("Failed to parse {location}: {message}")]
    Parse { location: String, message: String },

    /// An include target could not be resolved.
    #[error("Include target not found: {location} (referenced from {referenced_from})")]
    Include { location: String, referenced_from: String },

    /// Two documents define the same item with unreconcilable attributes.
    #[error("Merge conflict on {location}: {detail} (sources: {left}, {right})")]
    MergeConflict {
        location: String,
        detail: String,
        left: String,
        right: String,
    },

    /// One validation pass produced errors. Carries the full finding list
    /// of the failing pass, warnings included.
    #[error("Schema validation failed with {} finding(s)", .0.len())]
    Validation(Vec<Finding>),

    /// File read/write failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot was written by a newer tool than the running binary.
    #[error("Snapshot was written by mkmig {snapshot}, but this binary is {current}; upgrade mkmig before generating")]
    SnapshotStale { snapshot: String, current: String },

    /// A migration file with the target number already exists.
    #[error("Migration file already exists: {0}")]
    MigrationExists(String),

    /// The migrations directory mixes sequential and timestamp numbering.
    #[error("Migrations directory mixes sequential and timestamp numbering; rename the files to one form")]
    MixedNumbering,
}

/// Result type alias for the schema pipeline.
pub type Result<T> = std::result::Result<T, Error>;
