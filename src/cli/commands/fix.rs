//! Tag fixing command.

use crate::config::Config;
use crate::fixer::TagFixer;
use crate::metadata::LoftyTags;
use crate::report::ConsoleReporter;
use crate::store::LocalStore;

use super::source_root;

/// Add missing track and disc counts across the source tree
pub fn cmd_fix(config: &Config) -> anyhow::Result<()> {
    let source = LocalStore::open(source_root(config)?)?;
    println!("Fixing tags in {:?}", source.root());

    let summary = TagFixer::new(&source, &LoftyTags, &LoftyTags, &ConsoleReporter).run()?;

    println!(
        "\nCompleted: {} directories, {} tags written, {} write errors, {} unreadable",
        summary.directories, summary.written, summary.failed, summary.unreadable
    );
    Ok(())
}
