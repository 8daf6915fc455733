//! Test utilities and fixtures for album-tidy tests.
//!
//! Provides an in-memory tag backend, a reporter that records its lines, and
//! builders for tag fixtures.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{MockTags, RecordingReporter, track};
//!
//! let tags = MockTags::new().with("a.mp3", track("X", "Y", "A", "1/1", Some("1/1")));
//! let reporter = RecordingReporter::default();
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{Error, Result};
use crate::fixer::WriteRequest;
use crate::metadata::{MetadataReader, MetadataWriter};
use crate::report::Reporter;
use crate::tags::{DirectoryTags, Field, TagSet};

/// Map-backed tags keyed by file name.
///
/// Files it has no entry for fail to read, like a non-audio file would.
#[derive(Debug, Default)]
pub struct MockTags {
    files: RefCell<HashMap<String, TagSet>>,
    read_only: HashSet<String>,
}

impl MockTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file's tags.
    pub fn with(self, name: &str, tags: TagSet) -> Self {
        self.files.borrow_mut().insert(name.to_string(), tags);
        self
    }

    /// Make every write to `name` fail.
    pub fn failing_writes(mut self, name: &str) -> Self {
        self.read_only.insert(name.to_string());
        self
    }

    /// Tags as they stand after any writes.
    pub fn current(&self, name: &str) -> TagSet {
        self.files
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no tags for {}", name))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl MetadataReader for MockTags {
    fn read(&self, path: &Path) -> Result<TagSet> {
        self.files
            .borrow()
            .get(&file_name(path))
            .cloned()
            .ok_or_else(|| Error::metadata(path, "not an audio file"))
    }
}

impl MetadataWriter for MockTags {
    fn write(&self, path: &Path, field: Field, value: &str) -> Result<()> {
        let name = file_name(path);
        if self.read_only.contains(&name) {
            return Err(Error::write(path, vec!["tag is read-only".to_string()]));
        }
        let mut files = self.files.borrow_mut();
        let tags = files
            .get_mut(&name)
            .ok_or_else(|| Error::write(path, vec!["no such file".to_string()]))?;
        tags.set(field, value);
        Ok(())
    }
}

/// Records lines as `"info: ..."`, `"error: ..."` and `"comment: ..."`.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    fn push(&self, kind: &str, message: &str) {
        self.lines.borrow_mut().push(format!("{}: {}", kind, message));
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }

    fn comment(&self, message: &str) {
        self.push("comment", message);
    }
}

/// A track's tags. Empty strings leave a field unset.
pub fn track(
    artist: &str,
    album: &str,
    title: &str,
    track_number: &str,
    disc: Option<&str>,
) -> TagSet {
    let mut tags = TagSet::new()
        .with(Field::Artist, artist)
        .with(Field::Album, album)
        .with(Field::Title, title)
        .with(Field::TrackNumber, track_number);
    if let Some(disc) = disc {
        tags.set(Field::PartOfASet, disc);
    }
    tags
}

/// A directory from `(file name, tags)` pairs, in the given order.
pub fn album(files: &[(&str, TagSet)]) -> DirectoryTags {
    files
        .iter()
        .map(|(name, tags)| (name.to_string(), tags.clone()))
        .collect()
}

/// Apply planned writes to an in-memory directory.
pub fn apply(tags: &mut DirectoryTags, writes: &[WriteRequest]) {
    for write in writes {
        let mut updated = tags
            .get(&write.file)
            .cloned()
            .unwrap_or_else(|| panic!("no file {}", write.file));
        updated.set(write.field, write.value.as_str());
        tags.insert(write.file.clone(), updated);
    }
}
