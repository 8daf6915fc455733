//! Command-line interface for album-tidy.
//!
//! Provides the `fix`, `rename`, `rename:noverify` and `rename:local`
//! commands over the configured source and destination directories.

mod commands;

pub use commands::{Cli, Commands, run_command};
