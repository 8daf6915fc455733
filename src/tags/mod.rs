//! Normalized per-file tags and the per-directory collection.
//!
//! A [`TagSet`] holds the fields the engine reasons about as named optional
//! values, plus a residual bag for everything else the reader found. A
//! [`DirectoryTags`] keeps one `TagSet` per file in listing order.
//!
//! # Disc groups
//!
//! Files are grouped by the *raw* `part_of_a_set` string, not just the disc
//! index. `"1/2"` and `"1/0"` are two different groups even though both say
//! "disc 1". The verifier and fixer both rely on this partitioning.

use std::collections::BTreeMap;
use std::fmt;

/// The field vocabulary shared by readers, writers and the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Artist,
    Album,
    Title,
    /// Album artist
    Band,
    TrackNumber,
    PartOfASet,
}

impl Field {
    /// The vocabulary name of this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Title => "title",
            Self::Band => "band",
            Self::TrackNumber => "track_number",
            Self::PartOfASet => "part_of_a_set",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags for one file.
///
/// Values are never empty strings: setting an empty value clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    artist: Option<String>,
    album: Option<String>,
    title: Option<String>,
    band: Option<String>,
    track_number: Option<String>,
    part_of_a_set: Option<String>,
    /// Fields outside the known vocabulary, kept as read
    pub extra: BTreeMap<String, Vec<String>>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for readers and fixtures.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Store `value` as given; a blank value clears the field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value: String = value.into();
        *self.slot_mut(field) = (!value.trim().is_empty()).then_some(value);
    }

    pub fn artist(&self) -> Option<&str> {
        self.get(Field::Artist)
    }

    pub fn album(&self) -> Option<&str> {
        self.get(Field::Album)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(Field::Title)
    }

    pub fn band(&self) -> Option<&str> {
        self.get(Field::Band)
    }

    pub fn track_number(&self) -> Option<&str> {
        self.get(Field::TrackNumber)
    }

    pub fn part_of_a_set(&self) -> Option<&str> {
        self.get(Field::PartOfASet)
    }

    /// Parsed `track_number`, or `0/0` when the field is absent.
    pub fn track(&self) -> NumberPair {
        self.track_number().map(NumberPair::parse).unwrap_or_default()
    }

    /// Parsed `part_of_a_set`, or `0/0` when the field is absent.
    pub fn disc(&self) -> NumberPair {
        self.part_of_a_set().map(NumberPair::parse).unwrap_or_default()
    }

    /// Album artist set and different from this file's own artist.
    pub fn has_distinct_band(&self) -> bool {
        self.band().is_some_and(|band| Some(band) != self.artist())
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Artist => &self.artist,
            Field::Album => &self.album,
            Field::Title => &self.title,
            Field::Band => &self.band,
            Field::TrackNumber => &self.track_number,
            Field::PartOfASet => &self.part_of_a_set,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Artist => &mut self.artist,
            Field::Album => &mut self.album,
            Field::Title => &mut self.title,
            Field::Band => &mut self.band,
            Field::TrackNumber => &mut self.track_number,
            Field::PartOfASet => &mut self.part_of_a_set,
        }
    }
}

/// An `"N"` or `"N/M"` value split into its components.
///
/// A missing total reads as `"0"`, meaning unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPair {
    pub index: String,
    pub total: String,
}

impl Default for NumberPair {
    fn default() -> Self {
        Self {
            index: "0".to_string(),
            total: "0".to_string(),
        }
    }
}

impl NumberPair {
    pub fn parse(raw: &str) -> Self {
        let (index, total) = match raw.split_once('/') {
            Some((index, total)) => (index.trim(), total.trim()),
            None => (raw.trim(), "0"),
        };
        Self {
            index: index.to_string(),
            total: if total.is_empty() { "0" } else { total }.to_string(),
        }
    }

    /// Numeric index; non-numeric text counts as 0.
    pub fn index_value(&self) -> u32 {
        self.index.parse().unwrap_or(0)
    }

    /// Numeric total, `None` when it is not a number.
    pub fn total_value(&self) -> Option<u32> {
        self.total.parse().ok()
    }

    pub fn is_index_unset(&self) -> bool {
        self.index_value() == 0
    }

    pub fn is_total_unknown(&self) -> bool {
        self.total_value() == Some(0)
    }

    /// Canonical `"N/M"` form with a replacement total.
    pub fn with_total(&self, total: usize) -> String {
        format!("{}/{}", self.index, total)
    }
}

/// All files directly inside one directory, keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryTags {
    entries: Vec<(String, TagSet)>,
}

impl DirectoryTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any earlier entry with the same name in place.
    pub fn insert(&mut self, file: impl Into<String>, tags: TagSet) {
        let file = file.into();
        match self.entries.iter_mut().find(|(name, _)| *name == file) {
            Some(entry) => entry.1 = tags,
            None => self.entries.push((file, tags)),
        }
    }

    pub fn get(&self, file: &str) -> Option<&TagSet> {
        self.entries
            .iter()
            .find(|(name, _)| name == file)
            .map(|(_, tags)| tags)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagSet)> {
        self.entries.iter().map(|(name, tags)| (name.as_str(), tags))
    }

    pub fn tag_sets(&self) -> impl Iterator<Item = &TagSet> {
        self.entries.iter().map(|(_, tags)| tags)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Partition by raw `part_of_a_set`, in order of first appearance.
    pub fn disc_groups(&self) -> Vec<DiscGroup<'_>> {
        let mut groups: Vec<DiscGroup<'_>> = Vec::new();
        for (name, tags) in self.iter() {
            let key = tags.part_of_a_set();
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.files.push((name, tags)),
                None => groups.push(DiscGroup {
                    key,
                    files: vec![(name, tags)],
                }),
            }
        }
        groups
    }
}

impl FromIterator<(String, TagSet)> for DirectoryTags {
    fn from_iter<I: IntoIterator<Item = (String, TagSet)>>(iter: I) -> Self {
        let mut tags = Self::new();
        for (file, set) in iter {
            tags.insert(file, set);
        }
        tags
    }
}

/// Files sharing one raw disc value.
#[derive(Debug, Clone)]
pub struct DiscGroup<'a> {
    /// Raw `part_of_a_set`, `None` for files without one
    pub key: Option<&'a str>,
    pub files: Vec<(&'a str, &'a TagSet)>,
}

impl DiscGroup<'_> {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn disc(&self) -> NumberPair {
        self.key.map(NumberPair::parse).unwrap_or_default()
    }

    /// Label used in messages.
    pub fn label(&self) -> &str {
        self.key.unwrap_or("none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::track;

    #[test]
    fn test_empty_value_clears_field() {
        let mut tags = TagSet::new().with(Field::Artist, "X");
        assert_eq!(tags.artist(), Some("X"));
        tags.set(Field::Artist, "   ");
        assert_eq!(tags.artist(), None);
    }

    #[test]
    fn test_values_kept_verbatim() {
        let tags = TagSet::new().with(Field::Album, "Y ");
        assert_eq!(tags.album(), Some("Y "));
        assert_ne!(tags, TagSet::new().with(Field::Album, "Y"));
    }

    #[test]
    fn test_number_pair_forms() {
        let pair = NumberPair::parse("3/12");
        assert_eq!(pair.index, "3");
        assert_eq!(pair.total_value(), Some(12));

        let bare = NumberPair::parse("7");
        assert_eq!(bare.index_value(), 7);
        assert!(bare.is_total_unknown());

        let junk = NumberPair::parse("a/b");
        assert_eq!(junk.index_value(), 0);
        assert_eq!(junk.total_value(), None);
        assert!(!junk.is_total_unknown());
    }

    #[test]
    fn test_with_total_keeps_raw_index() {
        assert_eq!(NumberPair::parse("03/0").with_total(9), "03/9");
    }

    #[test]
    fn test_distinct_band() {
        assert!(!TagSet::new().with(Field::Artist, "A").has_distinct_band());
        assert!(
            !TagSet::new()
                .with(Field::Artist, "A")
                .with(Field::Band, "A")
                .has_distinct_band()
        );
        assert!(
            TagSet::new()
                .with(Field::Artist, "A")
                .with(Field::Band, "Various")
                .has_distinct_band()
        );
    }

    #[test]
    fn test_insert_keeps_listing_order() {
        let mut dir = DirectoryTags::new();
        dir.insert("b.mp3", track("X", "Y", "B", "2/2", None));
        dir.insert("a.mp3", track("X", "Y", "A", "1/2", None));
        dir.insert("b.mp3", track("X", "Y", "B2", "2/2", None));

        let names: Vec<&str> = dir.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b.mp3", "a.mp3"]);
        assert_eq!(dir.get("b.mp3").and_then(TagSet::title), Some("B2"));
    }

    #[test]
    fn test_disc_groups_split_on_raw_value() {
        // "1/2" and "1/0" both mean disc 1 but are separate groups
        let dir: DirectoryTags = [
            ("a.mp3", "1/2"),
            ("b.mp3", "1/0"),
            ("c.mp3", "1/2"),
            ("d.mp3", "2/2"),
        ]
        .into_iter()
        .map(|(name, disc)| (name.to_string(), track("X", "Y", name, "1/1", Some(disc))))
        .collect();

        let groups = dir.disc_groups();
        let keys: Vec<Option<&str>> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![Some("1/2"), Some("1/0"), Some("2/2")]);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_missing_disc_is_its_own_group() {
        let dir: DirectoryTags = [
            ("a.mp3".to_string(), track("X", "Y", "A", "1/2", None)),
            ("b.mp3".to_string(), track("X", "Y", "B", "2/2", None)),
        ]
        .into_iter()
        .collect();

        let groups = dir.disc_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label(), "none");
        assert!(groups[0].disc().is_index_unset());
    }
}
