//! # Mkmig - Declarative Migration Generator
//!
//! A command-line utility that turns declarative YAML schema documents
//! into versioned, dialect-specific SQL migrations for the goose
//! migration runner.
//!
//! ## Features
//!
//! - **Declarative Schemas**: describe the desired state in YAML, with
//!   merge and include semantics across modules
//! - **Snapshot Diffing**: only the structural difference since the last
//!   generated migration is emitted
//! - **Four Dialects**: PostgreSQL, MySQL, SQLite and SQL Server emitters
//!   behind one capability set
//! - **Reversible Migrations**: every forward change carries its inverse,
//!   reconstructed from the snapshot
//! - **Destructive-Change Policy**: review annotations, rejections and
//!   interactive confirmation for data-losing statements
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mkmig::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod dialect;
pub mod libs;
pub mod migration;
pub mod schema;
