//! Centralized message management for the mkmig application.
//!
//! All user-facing text flows through one place: the [`Message`] enum holds
//! every message the application can emit, the display module renders it,
//! and the macros route it to the console or the tracing system depending
//! on the active mode.
//!
//! ## Features
//!
//! - **Type Safety**: message parameters are checked at compile time
//! - **Centralization**: a single source of truth for all wording
//! - **Consistency**: uniform prefixes and formatting per category
//!
//! ## Usage
//!
//! ```rust
//! use mkmig::libs::messages::Message;
//! use mkmig::{msg_info, msg_success};
//!
//! msg_success!(Message::ConfigSaved);
//! msg_info!(Message::SchemasLoaded(2));
//! ```

pub mod display;
pub mod macros;
pub mod types;

// Re-export the main Message type for convenient access
pub use types::Message;
