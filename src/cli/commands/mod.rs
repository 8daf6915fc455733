//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `fix`: fill in missing track and disc counts
//! - `rename`: verify albums and move them into the library

mod fix;
mod rename;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::{self, Config};
use crate::reorganizer::Mode;

pub use fix::cmd_fix;
pub use rename::cmd_rename;

/// Album Tidy CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/album-tidy/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding incoming albums
    #[arg(long, global = true, env = "ALBUM_TIDY_SOURCE")]
    pub source: Option<PathBuf>,

    /// Library directory albums are moved into
    #[arg(long, global = true, env = "ALBUM_TIDY_DESTINATION")]
    pub destination: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Add missing track and disc counts to tags in the source directory
    Fix,
    /// Verify each album and move the ones that pass into the library
    Rename,
    /// Move every album into the library without verifying it
    #[command(name = "rename:noverify")]
    RenameNoVerify,
    /// Rename albums in place inside the source directory
    #[command(name = "rename:local")]
    RenameLocal,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    }
    .with_overrides(cli.source.clone(), cli.destination.clone());
    debug!(?config, command = ?cli.command, "Running command");

    match cli.command {
        Commands::Fix => cmd_fix(&config),
        Commands::Rename => cmd_rename(&config, Mode::VerifyAndMove),
        Commands::RenameNoVerify => cmd_rename(&config, Mode::MoveWithoutVerify),
        Commands::RenameLocal => cmd_rename(&config, Mode::MoveLocally),
    }
}

/// Source root from the merged configuration
pub(crate) fn source_root(config: &Config) -> anyhow::Result<PathBuf> {
    Ok(config.source_root()?.to_path_buf())
}
