//! Lyra CLI
//!
//! Headless driver for the Lyra playback core: lists and inspects tracks,
//! toggles preferences, and runs the playback controller against the silent
//! backend.

pub mod config;
pub mod error;

pub use config::CliConfig;
pub use error::{CliError, Result};
