//! Album Tidy - verify, repair and reorganize tagged album directories.
//!
//! Walks a source tree of album directories, checks that each directory's
//! tags describe one complete album, fills in missing track and disc counts,
//! and moves albums into an `Artist/Album/NN - Title.mp3` layout.

pub mod cli;
pub mod config;
pub mod error;
pub mod fixer;
pub mod metadata;
pub mod organizer;
pub mod reorganizer;
pub mod report;
pub mod store;
pub mod tags;
#[cfg(test)]
pub mod test_utils;
pub mod verifier;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; progress lines go through the reporter on stdout
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_else(|_| "album_tidy=warn".to_string()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run_command(&args)
}
