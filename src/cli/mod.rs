//! Command-line interface for midx.
//!
//! Thin commands over the library: scanning, catalog listings, removals
//! and cover art lookup.

mod commands;

pub use commands::{Cli, Commands, run_command};
