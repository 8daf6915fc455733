//! Album consistency checks.
//!
//! Decides whether the files in one directory form a coherent album that can
//! be moved as a unit. Every check runs; issues accumulate in check order:
//!
//! ```text
//! 1. artist / album / title present on every file
//! 2. one album name
//! 3. one album artist (compilations) or one artist
//! 4. per disc: one track total, equal to the disc's file count
//! 5. per disc: distinct track numbers, highest == file count
//! 6. one disc total, equal to the number of discs
//! 7. distinct disc numbers, highest == number of discs
//! ```
//!
//! Check 5 compares the highest number against the count instead of testing
//! that every number in `1..=count` is present.

use std::collections::HashSet;
use std::fmt;

use crate::tags::{DirectoryTags, DiscGroup, Field};

/// Fields every file must carry.
const REQUIRED_FIELDS: [Field; 3] = [Field::Artist, Field::Album, Field::Title];

/// Outcome of verifying one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    /// Issues in the order the checks ran
    pub issues: Vec<Issue>,
}

impl Verification {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Human-readable reasons, in check order.
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(Issue::description).collect()
    }
}

/// A reason a directory cannot be moved as an album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// At least one file lacks this field
    MissingField(Field),
    AlbumMismatch,
    /// Some files carry an album artist, others don't
    AlbumArtistMissing,
    AlbumArtistMismatch,
    ArtistMismatch,
    TrackTotalsDiffer {
        disc: String,
    },
    TrackTotalWrong {
        disc: String,
        total: String,
        files: usize,
    },
    DuplicateTrackNumbers {
        disc: String,
    },
    TrackNumbersIncomplete {
        disc: String,
        highest: u32,
        files: usize,
    },
    DiscTotalsDiffer,
    DiscTotalWrong {
        total: String,
        discs: usize,
    },
    DuplicateDiscNumbers,
    DiscNumbersIncomplete {
        highest: u32,
        discs: usize,
    },
}

impl Issue {
    /// Get human-readable description
    pub fn description(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Missing {} tag", field),
            Self::AlbumMismatch => "Album names differ".to_string(),
            Self::AlbumArtistMissing => "Album artist missing on some files".to_string(),
            Self::AlbumArtistMismatch => "Album artists differ".to_string(),
            Self::ArtistMismatch => "Artists differ".to_string(),
            Self::TrackTotalsDiffer { disc } => format!("Disc {}: track counts differ", disc),
            Self::TrackTotalWrong { disc, total, files } => {
                format!(
                    "Disc {}: track count is {} but there are {} files",
                    disc, total, files
                )
            }
            Self::DuplicateTrackNumbers { disc } => {
                format!("Disc {}: duplicate track numbers", disc)
            }
            Self::TrackNumbersIncomplete {
                disc,
                highest,
                files,
            } => {
                format!(
                    "Disc {}: highest track number is {} but there are {} files",
                    disc, highest, files
                )
            }
            Self::DiscTotalsDiffer => "Disc counts differ".to_string(),
            Self::DiscTotalWrong { total, discs } => {
                format!("Disc count is {} but there are {} discs", total, discs)
            }
            Self::DuplicateDiscNumbers => "Duplicate disc numbers".to_string(),
            Self::DiscNumbersIncomplete { highest, discs } => {
                format!(
                    "Highest disc number is {} but there are {} discs",
                    highest, discs
                )
            }
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Run every check against a directory's tags.
pub fn verify(tags: &DirectoryTags) -> Verification {
    let mut issues = Vec::new();
    let groups = tags.disc_groups();

    check_required_fields(tags, &mut issues);
    check_album(tags, &mut issues);
    check_artists(tags, &mut issues);
    for group in &groups {
        check_track_total(group, &mut issues);
    }
    for group in &groups {
        check_track_numbers(group, &mut issues);
    }
    check_disc_total(&groups, &mut issues);
    check_disc_numbers(&groups, &mut issues);

    Verification { issues }
}

fn check_required_fields(tags: &DirectoryTags, issues: &mut Vec<Issue>) {
    for field in REQUIRED_FIELDS {
        if tags.tag_sets().any(|t| t.get(field).is_none()) {
            issues.push(Issue::MissingField(field));
        }
    }
}

fn check_album(tags: &DirectoryTags, issues: &mut Vec<Issue>) {
    if !all_same(tags.tag_sets().map(|t| t.album())) {
        issues.push(Issue::AlbumMismatch);
    }
}

fn check_artists(tags: &DirectoryTags, issues: &mut Vec<Issue>) {
    if tags.tag_sets().any(|t| t.band().is_some()) {
        if tags.tag_sets().any(|t| t.band().is_none()) {
            issues.push(Issue::AlbumArtistMissing);
        }
        if !all_same(tags.tag_sets().filter_map(|t| t.band())) {
            issues.push(Issue::AlbumArtistMismatch);
        }
    } else if !all_same(tags.tag_sets().map(|t| t.artist())) {
        issues.push(Issue::ArtistMismatch);
    }
}

fn check_track_total(group: &DiscGroup<'_>, issues: &mut Vec<Issue>) {
    let tracks: Vec<_> = group.files.iter().map(|(_, t)| t.track()).collect();
    if !all_same(tracks.iter().map(|t| t.total_value())) {
        issues.push(Issue::TrackTotalsDiffer {
            disc: group.label().to_string(),
        });
    } else if let Some(first) = tracks.first()
        && first.total_value() != u32::try_from(group.len()).ok()
    {
        issues.push(Issue::TrackTotalWrong {
            disc: group.label().to_string(),
            total: first.total.clone(),
            files: group.len(),
        });
    }
}

fn check_track_numbers(group: &DiscGroup<'_>, issues: &mut Vec<Issue>) {
    let numbers: Vec<u32> = group
        .files
        .iter()
        .map(|(_, t)| t.track().index_value())
        .collect();
    check_numbering(
        &numbers,
        group.len(),
        || Issue::DuplicateTrackNumbers {
            disc: group.label().to_string(),
        },
        |highest| Issue::TrackNumbersIncomplete {
            disc: group.label().to_string(),
            highest,
            files: group.len(),
        },
        issues,
    );
}

fn check_disc_total(groups: &[DiscGroup<'_>], issues: &mut Vec<Issue>) {
    let discs: Vec<_> = groups.iter().map(DiscGroup::disc).collect();
    if !all_same(discs.iter().map(|d| d.total_value())) {
        issues.push(Issue::DiscTotalsDiffer);
    } else if let Some(first) = discs.first()
        && first.total_value() != u32::try_from(groups.len()).ok()
    {
        issues.push(Issue::DiscTotalWrong {
            total: first.total.clone(),
            discs: groups.len(),
        });
    }
}

fn check_disc_numbers(groups: &[DiscGroup<'_>], issues: &mut Vec<Issue>) {
    let numbers: Vec<u32> = groups.iter().map(|g| g.disc().index_value()).collect();
    check_numbering(
        &numbers,
        groups.len(),
        || Issue::DuplicateDiscNumbers,
        |highest| Issue::DiscNumbersIncomplete {
            highest,
            discs: groups.len(),
        },
        issues,
    );
}

/// Numbers must be distinct and the highest must equal `count`.
fn check_numbering(
    numbers: &[u32],
    count: usize,
    duplicate: impl FnOnce() -> Issue,
    incomplete: impl FnOnce(u32) -> Issue,
    issues: &mut Vec<Issue>,
) {
    let distinct: HashSet<u32> = numbers.iter().copied().collect();
    if distinct.len() != numbers.len() {
        issues.push(duplicate());
    }
    let highest = numbers.iter().copied().max().unwrap_or(0);
    if usize::try_from(highest).ok() != Some(count) {
        issues.push(incomplete(highest));
    }
}

fn all_same<T: PartialEq>(mut values: impl Iterator<Item = T>) -> bool {
    match values.next() {
        Some(first) => values.all(|v| v == first),
        None => true,
    }
}
