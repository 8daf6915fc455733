//! Moves verified albums into a tidy directory layout.
//!
//! The source store is walked depth first, children before parents. Each
//! directory that holds files is read, optionally verified, and each file is
//! moved to the path [`build_path`] gives it in the destination store.
//! Once a directory and everything under it is empty it is removed; the
//! root of the walk never is.
//!
//! # Partial moves
//!
//! A move is a copy followed by a delete. If the copy succeeds and the delete
//! fails, the file exists in both stores; if the copy fails part way, a
//! truncated file may be left at the destination. Either case is reported
//! as a move failure and the walk continues with the next file.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::metadata::{self, MetadataReader};
use crate::organizer::{DirectoryFlags, build_path};
use crate::report::{Reporter, display_dir};
use crate::store::FileStore;
use crate::tags::DirectoryTags;
use crate::verifier;

/// How a run treats each directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Verify first, move only albums that pass
    VerifyAndMove,
    /// Move everything into the destination store
    MoveWithoutVerify,
    /// Rename in place inside the source store
    MoveLocally,
}

impl Mode {
    fn verifies(self) -> bool {
        matches!(self, Self::VerifyAndMove)
    }
}

/// Counts from a rename run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameSummary {
    /// Directories that held files
    pub directories: usize,
    /// Directories left alone because verification failed
    pub rejected: usize,
    /// Directories left alone because their tags could not be read
    pub unreadable: usize,
    pub moved: usize,
    /// Files already at their destination
    pub unchanged: usize,
    pub failed: usize,
    pub removed_directories: usize,
}

/// Walks the source store and moves files per [`Mode`].
pub struct Reorganizer<'a> {
    source: &'a dyn FileStore,
    destination: &'a dyn FileStore,
    reader: &'a dyn MetadataReader,
    reporter: &'a dyn Reporter,
}

impl<'a> Reorganizer<'a> {
    pub fn new(
        source: &'a dyn FileStore,
        destination: &'a dyn FileStore,
        reader: &'a dyn MetadataReader,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            source,
            destination,
            reader,
            reporter,
        }
    }

    pub fn run(&self, mode: Mode) -> Result<RenameSummary> {
        let destination = match mode {
            Mode::MoveLocally => self.source,
            Mode::VerifyAndMove | Mode::MoveWithoutVerify => self.destination,
        };

        let mut summary = RenameSummary::default();
        self.visit(Path::new(""), mode, destination, &mut summary)?;
        info!(?mode, ?summary, "Rename complete");
        Ok(summary)
    }

    fn visit(
        &self,
        dir: &Path,
        mode: Mode,
        destination: &dyn FileStore,
        summary: &mut RenameSummary,
    ) -> Result<()> {
        for subdirectory in self.source.list_directories(dir)? {
            self.visit(&subdirectory, mode, destination, summary)?;
        }

        let files = self.source.list_files(dir)?;
        if files.is_empty() {
            debug!(dir = %dir.display(), "No files");
            self.reporter
                .comment(&format!("Directory \"{}\" has no files", display_dir(dir)));
        } else {
            summary.directories += 1;
            self.process(dir, &files, mode, destination, summary)?;
        }

        self.cleanup(dir, summary)
    }

    fn process(
        &self,
        dir: &Path,
        files: &[PathBuf],
        mode: Mode,
        destination: &dyn FileStore,
        summary: &mut RenameSummary,
    ) -> Result<()> {
        let tags = match metadata::read_directory(self.source, self.reader, files) {
            Ok(tags) => tags,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                self.reporter
                    .error(&format!("Could not read tags in \"{}\"", display_dir(dir)));
                self.reporter.comment(&e.to_string());
                summary.unreadable += 1;
                return Ok(());
            }
        };

        if mode.verifies() {
            let verification = verifier::verify(&tags);
            if !verification.is_ok() {
                debug!(dir = %dir.display(), issues = ?verification.issues, "Verification failed");
                self.reporter
                    .error(&format!("Could not move \"{}\"", display_dir(dir)));
                for reason in verification.errors() {
                    self.reporter.comment(&reason);
                }
                summary.rejected += 1;
                return Ok(());
            }
        }

        self.reporter
            .info(&format!("Moving \"{}\"", display_dir(dir)));
        self.move_files(dir, &tags, destination, summary);
        Ok(())
    }

    fn move_files(
        &self,
        dir: &Path,
        tags: &DirectoryTags,
        destination: &dyn FileStore,
        summary: &mut RenameSummary,
    ) {
        let flags = DirectoryFlags::from_tags(tags);

        for (name, file_tags) in tags.iter() {
            let from = dir.join(name);
            let to = match build_path(file_tags, flags.multi_disc, flags.mixed_artists) {
                Ok(path) => PathBuf::from(path),
                Err(e) => {
                    warn!(file = %from.display(), error = %e, "No destination");
                    self.reporter
                        .error(&format!("Could not move {}: {}", from.display(), e));
                    summary.failed += 1;
                    continue;
                }
            };

            if self.source.resolve_absolute(&from) == destination.resolve_absolute(&to) {
                debug!(file = %from.display(), "Already in place");
                summary.unchanged += 1;
                continue;
            }

            match self.move_file(&from, destination, &to) {
                Ok(()) => {
                    debug!(from = %from.display(), to = %to.display(), "Moved");
                    summary.moved += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Move failed");
                    self.reporter.error(&e.to_string());
                    summary.failed += 1;
                }
            }
        }
    }

    fn move_file(&self, from: &Path, destination: &dyn FileStore, to: &Path) -> Result<()> {
        let fail = |e: Error| Error::move_failed(from, to, e.to_string());

        let mut stream = self.source.read_stream(from).map_err(fail)?;
        destination.put(to, &mut stream).map_err(fail)?;
        drop(stream);
        self.source.delete(from).map_err(fail)
    }

    fn cleanup(&self, dir: &Path, summary: &mut RenameSummary) -> Result<()> {
        if dir.as_os_str().is_empty() {
            return Ok(());
        }
        if !self.source.all_files_recursive(dir)?.is_empty()
            || !self.source.all_directories_recursive(dir)?.is_empty()
        {
            return Ok(());
        }

        self.reporter.info(&format!(
            "Directory \"{}\" is empty; removing",
            display_dir(dir)
        ));
        match self.source.delete_directory(dir) {
            Ok(()) => summary.removed_directories += 1,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Could not remove directory");
                self.reporter.error(&e.to_string());
            }
        }
        Ok(())
    }
}
