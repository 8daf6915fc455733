//! Destination paths derived from tags.
//!
//! Every file lands at
//!
//! ```text
//! {Artist|AlbumArtist}/{Album}/[{Disc} - ]{Track} - [{Artist} - ]{Title}.mp3
//! ```
//!
//! The disc prefix appears only when the directory holds more than one disc
//! group. The album artist replaces the artist at the top level, and the
//! track artist is added to the file name, only when some file's album
//! artist differs from its own artist.

use tracing::trace;

use crate::error::{Error, Result};
use crate::tags::{DirectoryTags, Field, TagSet};

/// Extension given to every destination file.
pub const EXTENSION: &str = "mp3";

/// Directory-level switches for [`build_path`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryFlags {
    /// More (or fewer) than one distinct raw disc value
    pub multi_disc: bool,
    /// Some file's album artist differs from its own artist
    pub mixed_artists: bool,
}

impl DirectoryFlags {
    pub fn from_tags(tags: &DirectoryTags) -> Self {
        Self {
            multi_disc: tags.disc_groups().len() != 1,
            mixed_artists: tags.tag_sets().any(TagSet::has_distinct_band),
        }
    }
}

/// Relative destination path for one file, using `/` separators.
///
/// Fails when a tag the path needs is missing.
pub fn build_path(tags: &TagSet, multi_disc: bool, mixed_artists: bool) -> Result<String> {
    let top = if mixed_artists {
        required(tags, Field::Band)?
    } else {
        required(tags, Field::Artist)?
    };
    let album = required(tags, Field::Album)?;
    let title = required(tags, Field::Title)?;

    let mut file_name = String::new();
    if multi_disc {
        file_name.push_str(&tags.disc().index);
        file_name.push_str(" - ");
    }
    file_name.push_str(&format!("{:0>2}", tags.track().index));
    file_name.push_str(" - ");
    if mixed_artists {
        file_name.push_str(&sanitize_segment(required(tags, Field::Artist)?));
        file_name.push_str(" - ");
    }
    file_name.push_str(&sanitize_segment(title));

    let path = format!(
        "{}/{}/{}.{}",
        sanitize_segment(top),
        sanitize_segment(album),
        file_name,
        EXTENSION
    );
    trace!(%path, "Built destination path");
    Ok(path)
}

fn required(tags: &TagSet, field: Field) -> Result<&str> {
    tags.get(field).ok_or(Error::MissingTag { field })
}

/// Make a tag value safe to use as one path segment.
///
/// `/` becomes `-`, `* $ # % ^` become `_`, `&` and `+` become `and`, and
/// `' " ! ?` and `’` are dropped.
pub fn sanitize_segment(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '/' => out.push('-'),
            '*' | '$' | '#' | '%' | '^' => out.push('_'),
            '&' | '+' => out.push_str("and"),
            '\'' | '"' | '!' | '?' | '\u{2019}' => {}
            _ => out.push(c),
        }
    }
    out
}
