//! Album moving commands.

use crate::config::Config;
use crate::metadata::LoftyTags;
use crate::reorganizer::{Mode, Reorganizer};
use crate::report::ConsoleReporter;
use crate::store::LocalStore;

use super::source_root;

/// Move albums from the source tree per `mode`
pub fn cmd_rename(config: &Config, mode: Mode) -> anyhow::Result<()> {
    let source = LocalStore::open(source_root(config)?)?;

    // Renaming in place never touches a destination directory
    let destination = match mode {
        Mode::MoveLocally => source.clone(),
        Mode::VerifyAndMove | Mode::MoveWithoutVerify => {
            LocalStore::create(config.destination_root()?)?
        }
    };

    println!("Moving albums from {:?}", source.root());
    if mode != Mode::MoveLocally {
        println!("Destination: {:?}", destination.root());
    }
    if mode == Mode::MoveWithoutVerify {
        println!("\n[NO VERIFY - albums are moved as tagged]\n");
    }

    let summary = Reorganizer::new(&source, &destination, &LoftyTags, &ConsoleReporter).run(mode)?;

    println!(
        "\nCompleted: {} moved, {} already in place, {} errors, {} albums rejected, {} unreadable, {} directories removed",
        summary.moved,
        summary.unchanged,
        summary.failed,
        summary.rejected,
        summary.unreadable,
        summary.removed_directories
    );
    Ok(())
}
