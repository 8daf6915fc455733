//! Automatic repair of missing track and disc counts.
//!
//! [`fix`] is a pure planner: it looks at one directory's tags and returns
//! the minimal set of single-field writes. [`TagFixer`] walks the source
//! store, plans each directory and hands the writes to a [`MetadataWriter`].
//!
//! # Repairs
//!
//! All three passes look at the tags as read, never at each other's output:
//!
//! 1. **Track count** - a disc whose track totals are all unknown gets
//!    `N/<files on that disc>` on every track.
//! 2. **Disc number** - a directory with a single, unnumbered disc gets
//!    `1/1` on every file.
//! 3. **Disc count** - otherwise, if every disc total is unknown, each
//!    numbered file gets `N/<number of discs>`. Files with no disc number
//!    are not written.
//!
//! Once a total is written the "all unknown" precondition no longer holds,
//! so running the fixer twice writes nothing the second time.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::metadata::{self, MetadataReader, MetadataWriter};
use crate::report::{Reporter, display_dir};
use crate::store::FileStore;
use crate::tags::{DirectoryTags, Field};

/// Why a write was planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    TrackCount { disc: String },
    DiscNumber,
    DiscCount,
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrackCount { disc } => write!(f, "track count for disc {}", disc),
            Self::DiscNumber => f.write_str("disc number"),
            Self::DiscCount => f.write_str("disc count"),
        }
    }
}

/// Overwrite one field of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    /// File name within the directory
    pub file: String,
    pub field: Field,
    pub value: String,
    pub repair: Repair,
}

/// Plan the writes that repair a directory's counts.
pub fn fix(tags: &DirectoryTags) -> Vec<WriteRequest> {
    let mut writes = Vec::new();
    let groups = tags.disc_groups();

    for group in &groups {
        if group.files.iter().all(|(_, t)| t.track().is_total_unknown()) {
            let repair = Repair::TrackCount {
                disc: group.label().to_string(),
            };
            for (file, file_tags) in &group.files {
                if file_tags.track_number().is_none() {
                    continue;
                }
                writes.push(WriteRequest {
                    file: file.to_string(),
                    field: Field::TrackNumber,
                    value: file_tags.track().with_total(group.len()),
                    repair: repair.clone(),
                });
            }
        }
    }

    if groups.len() == 1 && groups[0].disc().is_index_unset() {
        for (file, _) in tags.iter() {
            writes.push(WriteRequest {
                file: file.to_string(),
                field: Field::PartOfASet,
                value: "1/1".to_string(),
                repair: Repair::DiscNumber,
            });
        }
    } else if groups.iter().all(|g| g.disc().is_total_unknown()) {
        for (file, file_tags) in tags.iter() {
            let disc = file_tags.disc();
            // Unnumbered discs have no index to keep
            if disc.is_index_unset() {
                continue;
            }
            writes.push(WriteRequest {
                file: file.to_string(),
                field: Field::PartOfASet,
                value: disc.with_total(groups.len()),
                repair: Repair::DiscCount,
            });
        }
    }

    writes
}

/// Counts from a fix run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub directories: usize,
    pub written: usize,
    pub failed: usize,
    /// Directories skipped because their tags could not be read
    pub unreadable: usize,
}

/// Walks the source store and applies [`fix`] to every directory.
pub struct TagFixer<'a> {
    source: &'a dyn FileStore,
    reader: &'a dyn MetadataReader,
    writer: &'a dyn MetadataWriter,
    reporter: &'a dyn Reporter,
}

impl<'a> TagFixer<'a> {
    pub fn new(
        source: &'a dyn FileStore,
        reader: &'a dyn MetadataReader,
        writer: &'a dyn MetadataWriter,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            source,
            reader,
            writer,
            reporter,
        }
    }

    /// Fix the whole tree, children before parents.
    pub fn run(&self) -> Result<FixSummary> {
        let mut summary = FixSummary::default();
        self.visit(Path::new(""), &mut summary)?;
        info!(?summary, "Fix complete");
        Ok(summary)
    }

    fn visit(&self, dir: &Path, summary: &mut FixSummary) -> Result<()> {
        for subdirectory in self.source.list_directories(dir)? {
            self.visit(&subdirectory, summary)?;
        }

        let files = self.source.list_files(dir)?;
        if files.is_empty() {
            return Ok(());
        }
        summary.directories += 1;

        let tags = match metadata::read_directory(self.source, self.reader, &files) {
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

        let writes = fix(&tags);
        debug!(dir = %dir.display(), writes = writes.len(), "Planned fixes");

        let mut last_repair = None;
        for request in &writes {
            if last_repair != Some(&request.repair) {
                self.reporter
                    .info(&format!("Adding {} to \"{}\"", request.repair, display_dir(dir)));
                last_repair = Some(&request.repair);
            }
            self.apply(dir.join(&request.file), request, summary);
        }
        Ok(())
    }

    fn apply(&self, file: PathBuf, request: &WriteRequest, summary: &mut FixSummary) {
        let path = self.source.resolve_absolute(&file);
        match self.writer.write(&path, request.field, &request.value) {
            Ok(()) => {
                debug!(path = %path.display(), field = %request.field, value = %request.value, "Fixed tag");
                summary.written += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Tag write failed");
                self.reporter
                    .error(&format!("Writing tags failed for {}:", file.display()));
                for message in e.messages() {
                    self.reporter.error(&message);
                }
                summary.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use crate::test_utils::{MockTags, RecordingReporter, album, track};
    use tempfile::tempdir;

    fn values(writes: &[WriteRequest]) -> Vec<(&str, Field, &str)> {
        writes
            .iter()
            .map(|w| (w.file.as_str(), w.field, w.value.as_str()))
            .collect()
    }

    #[test]
    fn test_adds_track_count_per_disc() {
        let dir = album(&[
            ("a.mp3", track("X", "Y", "A", "1/0", Some("1/2"))),
            ("b.mp3", track("X", "Y", "B", "2", Some("1/2"))),
            ("c.mp3", track("X", "Y", "C", "1/0", Some("2/2"))),
        ]);

        assert_eq!(
            values(&fix(&dir)),
            vec![
                ("a.mp3", Field::TrackNumber, "1/2"),
                ("b.mp3", Field::TrackNumber, "2/2"),
                ("c.mp3", Field::TrackNumber, "1/1"),
            ]
        );
    }

    #[test]
    fn test_known_track_total_left_alone() {
        let dir = album(&[
            ("a.mp3", track("X", "Y", "A", "1/0", Some("1/1"))),
            ("b.mp3", track("X", "Y", "B", "2/5", Some("1/1"))),
        ]);

        assert!(fix(&dir).is_empty());
    }

    #[test]
    fn test_collapses_single_unnumbered_disc() {
        let dir = album(&[
            ("a.mp3", track("X", "Y", "A", "1/2", None)),
            ("b.mp3", track("X", "Y", "B", "2/2", None)),
        ]);

        let writes = fix(&dir);
        assert_eq!(
            values(&writes),
            vec![
                ("a.mp3", Field::PartOfASet, "1/1"),
                ("b.mp3", Field::PartOfASet, "1/1"),
            ]
        );
        assert!(writes.iter().all(|w| w.repair == Repair::DiscNumber));
    }

    #[test]
    fn test_zero_disc_number_is_collapsed_too() {
        let dir = album(&[("a.mp3", track("X", "Y", "A", "1/1", Some("0/0")))]);
        assert_eq!(values(&fix(&dir)), vec![("a.mp3", Field::PartOfASet, "1/1")]);
    }

    #[test]
    fn test_adds_disc_count() {
        let dir = album(&[
            ("a.mp3", track("X", "Y", "A", "1/1", Some("1"))),
            ("b.mp3", track("X", "Y", "B", "1/1", Some("2/0"))),
        ]);

        assert_eq!(
            values(&fix(&dir)),
            vec![
                ("a.mp3", Field::PartOfASet, "1/2"),
                ("b.mp3", Field::PartOfASet, "2/2"),
            ]
        );
    }

    #[test]
    fn test_disc_count_skips_unnumbered_files() {
        let dir = album(&[
            ("a.mp3", track("X", "Y", "A", "1/1", Some("1"))),
            ("b.mp3", track("X", "Y", "B", "1/1", None)),
        ]);

        assert_eq!(values(&fix(&dir)), vec![("a.mp3", Field::PartOfASet, "1/2")]);
    }

    #[test]
    fn test_single_numbered_disc_gets_disc_count() {
        let dir = album(&[("a.mp3", track("X", "Y", "A", "1/1", Some("1")))]);
        assert_eq!(values(&fix(&dir)), vec![("a.mp3", Field::PartOfASet, "1/1")]);
        assert_eq!(fix(&dir)[0].repair, Repair::DiscCount);
    }

    #[test]
    fn test_missing_track_number_never_written() {
        let dir = album(&[
            ("a.mp3", track("X", "Y", "A", "1/0", Some("1/1"))),
            ("b.mp3", track("X", "Y", "B", "", Some("1/1"))),
        ]);

        assert_eq!(values(&fix(&dir)), vec![("a.mp3", Field::TrackNumber, "1/2")]);
    }

    #[test]
    fn test_passes_read_tags_as_given() {
        // Track count uses the single group as read even though the disc
        // collapse also rewrites every disc field.
        let dir = album(&[
            ("a.mp3", track("X", "Y", "A", "1", None)),
            ("b.mp3", track("X", "Y", "B", "2", None)),
        ]);

        assert_eq!(
            values(&fix(&dir)),
            vec![
                ("a.mp3", Field::TrackNumber, "1/2"),
                ("b.mp3", Field::TrackNumber, "2/2"),
                ("a.mp3", Field::PartOfASet, "1/1"),
                ("b.mp3", Field::PartOfASet, "1/1"),
            ]
        );
    }

    #[test]
    fn test_fix_then_fix_again_is_quiet() {
        let mut dir = album(&[
            ("a.mp3", track("X", "Y", "A", "1", Some("1"))),
            ("b.mp3", track("X", "Y", "B", "2", Some("1"))),
            ("c.mp3", track("X", "Y", "C", "1", Some("2"))),
        ]);

        let first = fix(&dir);
        assert_eq!(first.len(), 6);
        crate::test_utils::apply(&mut dir, &first);
        assert!(fix(&dir).is_empty());
        assert!(crate::verifier::verify(&dir).is_ok());
    }

    #[test]
    fn test_tag_fixer_writes_through_writer() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("Y")).unwrap();
        std::fs::write(temp.path().join("Y/a.mp3"), b"a").unwrap();
        std::fs::write(temp.path().join("Y/b.mp3"), b"b").unwrap();
        let store = LocalStore::open(temp.path()).unwrap();

        let tags = MockTags::new()
            .with("a.mp3", track("X", "Y", "A", "1/0", Some("1/1")))
            .with("b.mp3", track("X", "Y", "B", "2/0", Some("1/1")));
        let reporter = RecordingReporter::default();

        let summary = TagFixer::new(&store, &tags, &tags, &reporter).run().unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(
            reporter.lines(),
            vec!["info: Adding track count for disc 1/1 to \"Y\"".to_string()]
        );
        assert_eq!(tags.current("a.mp3").track_number(), Some("1/2"));
        assert_eq!(tags.current("b.mp3").track_number(), Some("2/2"));

        let again = TagFixer::new(&store, &tags, &tags, &reporter).run().unwrap();
        assert_eq!(again.written, 0);
    }

    #[test]
    fn test_write_failure_reported_and_siblings_continue() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("a.mp3"), b"a").unwrap();
        std::fs::write(temp.path().join("b.mp3"), b"b").unwrap();
        let store = LocalStore::open(temp.path()).unwrap();

        let tags = MockTags::new()
            .with("a.mp3", track("X", "Y", "A", "1", Some("1/1")))
            .with("b.mp3", track("X", "Y", "B", "2", Some("1/1")))
            .failing_writes("a.mp3");
        let reporter = RecordingReporter::default();

        let summary = TagFixer::new(&store, &tags, &tags, &reporter).run().unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.written, 1);
        assert_eq!(
            reporter.lines(),
            vec![
                "info: Adding track count for disc 1/1 to \"/\"".to_string(),
                "error: Writing tags failed for a.mp3:".to_string(),
                "error: tag is read-only".to_string(),
            ]
        );
        assert_eq!(tags.current("b.mp3").track_number(), Some("2/2"));
    }

    #[test]
    fn test_unreadable_directory_is_skipped() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("a.mp3"), b"a").unwrap();
        std::fs::write(temp.path().join("cover.jpg"), b"jpg").unwrap();
        let store = LocalStore::open(temp.path()).unwrap();

        let tags = MockTags::new().with("a.mp3", track("X", "Y", "A", "1", None));
        let reporter = RecordingReporter::default();

        let summary = TagFixer::new(&store, &tags, &tags, &reporter).run().unwrap();

        assert_eq!(summary.unreadable, 1);
        assert_eq!(summary.written, 0);
        assert_eq!(reporter.lines()[0], "error: Could not read tags in \"/\"");
    }
}
