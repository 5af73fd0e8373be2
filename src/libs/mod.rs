//! Core library modules for the mkmig application.
//!
//! The shared infrastructure every command builds on: configuration,
//! user messaging, and console rendering.
//!
//! ## Features
//!
//! - **Configuration**: `mkmig.json` persistence and the setup wizard
//! - **Messaging**: the `Message` enum and the `msg_*` macros
//! - **Presentation**: table rendering for findings and change plans
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mkmig::libs::config::Config;
//!
//! let config = Config::read()?;
//! println!("dialect: {}", config.dialect);
//! # anyhow::Ok(())
//! ```

pub mod config;
pub mod messages;
pub mod view;
