//! Audio file metadata reading and writing.
//!
//! Uses the lofty crate for format-independent metadata access. lofty maps
//! ID3v2 frames, MP4 atoms and Vorbis comments onto one set of item keys, so
//! a QuickTime `disk` atom and an ID3v2 `TPOS` frame both arrive here as the
//! disc number, and `aART` / `TPE2` both arrive as the album artist.
//!
//! # Field mapping
//! - title, artist, album → `title`, `artist`, `album`
//! - album artist → `band`
//! - track / track total → `track_number` (`"N"` or `"N/M"`)
//! - disc / disc total → `part_of_a_set` (`"N"` or `"N/M"`)
//! - any other text item → the tag set's residual bag

use std::path::{Path, PathBuf};

use lofty::config::WriteOptions;
use lofty::file::{TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagType};
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::FileStore;
use crate::tags::{DirectoryTags, Field, NumberPair, TagSet};

/// Reads normalized tags from a file.
pub trait MetadataReader {
    fn read(&self, path: &Path) -> Result<TagSet>;
}

/// Overwrites a single field in a file's tags.
///
/// Implementations touch only the named field; everything else stored in
/// the file (pictures, comments, lyrics, other text) is left as it is.
pub trait MetadataWriter {
    fn write(&self, path: &Path, field: Field, value: &str) -> Result<()>;
}

/// Read every listed file into a [`DirectoryTags`], keyed by file name.
///
/// Fails on the first file that cannot be read.
pub fn read_directory(
    store: &dyn FileStore,
    reader: &dyn MetadataReader,
    files: &[PathBuf],
) -> Result<DirectoryTags> {
    files
        .iter()
        .map(|file| {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let tags = reader.read(&store.resolve_absolute(file))?;
            Ok((name, tags))
        })
        .collect()
}

/// lofty-backed reader and writer.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTags;

impl MetadataReader for LoftyTags {
    fn read(&self, path: &Path) -> Result<TagSet> {
        // Probe the file to determine format and read tags
        let tagged_file = Probe::open(path)
            .map_err(|e| Error::metadata(path, format!("Failed to open file for probing: {}", e)))?
            .read()
            .map_err(|e| Error::metadata(path, format!("Failed to read file metadata: {}", e)))?;

        let tags = active_tag_type(&tagged_file)
            .and_then(|tag_type| tagged_file.tag(tag_type))
            .map(tag_set_from)
            .unwrap_or_default();

        debug!(path = %path.display(), ?tags, "Read tags");
        Ok(tags)
    }
}

impl MetadataWriter for LoftyTags {
    fn write(&self, path: &Path, field: Field, value: &str) -> Result<()> {
        let fail = |message: String| Error::write(path, vec![message]);

        let mut tagged_file = Probe::open(path)
            .map_err(|e| fail(format!("Failed to open file for writing: {}", e)))?
            .read()
            .map_err(|e| fail(format!("Failed to read file for tag writing: {}", e)))?;

        // Edit the tag the reader sees; only an untagged file gets a new one
        let tag_type = match active_tag_type(&tagged_file) {
            Some(tag_type) => tag_type,
            None => {
                let tag_type = tagged_file.primary_tag_type();
                tagged_file.insert_tag(Tag::new(tag_type));
                tag_type
            }
        };
        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or_else(|| fail(format!("No writable {:?} tag", tag_type)))?;

        match field {
            Field::Artist => tag.set_artist(value.to_string()),
            Field::Album => tag.set_album(value.to_string()),
            Field::Title => tag.set_title(value.to_string()),
            Field::Band => {
                if !tag.insert_text(ItemKey::AlbumArtist, value.to_string()) {
                    return Err(fail(format!("{:?} tags cannot hold an album artist", tag_type)));
                }
            }
            Field::TrackNumber => {
                let (number, total) = parse_pair(value).map_err(fail)?;
                tag.set_track(number);
                match total {
                    Some(total) => tag.set_track_total(total),
                    None => tag.remove_track_total(),
                }
            }
            Field::PartOfASet => {
                let (number, total) = parse_pair(value).map_err(fail)?;
                tag.set_disk(number);
                match total {
                    Some(total) => tag.set_disk_total(total),
                    None => tag.remove_disk_total(),
                }
            }
        }

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| fail(format!("Failed to write tags to file: {}", e)))?;

        debug!(path = %path.display(), %field, value, "Wrote tag");
        Ok(())
    }
}

/// The tag both reading and writing use: the primary tag, or the first
/// tag present when the format's primary tag is absent.
fn active_tag_type(tagged_file: &TaggedFile) -> Option<TagType> {
    tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .map(Tag::tag_type)
}

fn tag_set_from(tag: &Tag) -> TagSet {
    let mut tags = TagSet::new();

    if let Some(title) = tag.title() {
        tags.set(Field::Title, title);
    }
    if let Some(artist) = tag.artist() {
        tags.set(Field::Artist, artist);
    }
    if let Some(album) = tag.album() {
        tags.set(Field::Album, album);
    }
    if let Some(band) = tag.get_string(&ItemKey::AlbumArtist) {
        tags.set(Field::Band, band);
    }
    if let Some(track) = tag.track() {
        tags.set(Field::TrackNumber, format_pair(track, tag.track_total()));
    }
    if let Some(disc) = tag.disk() {
        tags.set(Field::PartOfASet, format_pair(disc, tag.disk_total()));
    }

    for item in tag.items() {
        if is_known_key(item.key()) {
            continue;
        }
        if let ItemValue::Text(text) = item.value()
            && !text.trim().is_empty()
        {
            tags.extra
                .entry(field_name(item.key()))
                .or_default()
                .push(text.clone());
        }
    }

    tags
}

fn is_known_key(key: &ItemKey) -> bool {
    matches!(
        key,
        ItemKey::TrackTitle
            | ItemKey::TrackArtist
            | ItemKey::AlbumTitle
            | ItemKey::AlbumArtist
            | ItemKey::TrackNumber
            | ItemKey::TrackTotal
            | ItemKey::DiscNumber
            | ItemKey::DiscTotal
    )
}

/// snake_case name for a residual item, e.g. `CopyrightMessage` → `copyright_message`.
fn field_name(key: &ItemKey) -> String {
    if let ItemKey::Unknown(name) = key {
        return name.to_lowercase();
    }

    let debug_name = format!("{:?}", key);
    let mut name = String::with_capacity(debug_name.len() + 4);
    for (i, c) in debug_name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

fn format_pair(number: u32, total: Option<u32>) -> String {
    match total {
        Some(total) => format!("{}/{}", number, total),
        None => number.to_string(),
    }
}

/// Numeric components for writing; a total of 0 means "clear the total".
fn parse_pair(value: &str) -> std::result::Result<(u32, Option<u32>), String> {
    let pair = NumberPair::parse(value);
    let number = pair
        .index
        .parse::<u32>()
        .map_err(|_| format!("'{}' is not a valid number", value))?;
    let total = pair
        .total_value()
        .ok_or_else(|| format!("'{}' has an invalid total", value))?;
    Ok((number, (total > 0).then_some(total)))
}
