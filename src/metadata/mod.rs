//! Audio file tag reading.
//!
//! Uses the lofty crate for tag access. Only two containers are indexed,
//! modelled as the closed [`ContainerFormat`] set: FLAC and MP3 (ID3v2).
//! Supporting a new container means adding a variant here and its picture
//! extraction in [`crate::cover`].
//!
//! Files are only ever read; tags are never written back.

use std::borrow::Cow;
use std::path::Path;

use lofty::file::{FileType, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag, TagType};

use crate::error::{Error, Result};

/// Audio container formats the indexer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    /// FLAC with Vorbis comments and PICTURE blocks
    Flac,
    /// MPEG audio (MP3) with an ID3v2 tag
    Mpeg,
}

impl ContainerFormat {
    pub const ALL: [ContainerFormat; 2] = [ContainerFormat::Flac, ContainerFormat::Mpeg];

    /// File name suffix, including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ContainerFormat::Flac => ".flac",
            ContainerFormat::Mpeg => ".mp3",
        }
    }

    /// Format of a file judged by its name.
    ///
    /// Matching is an exact, case-sensitive suffix match on the raw file
    /// name: `song.MP3` is not indexed, while a name that is not valid UTF-8
    /// still matches.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.as_encoded_bytes();
        Self::ALL
            .into_iter()
            .find(|format| name.ends_with(format.extension().as_bytes()))
    }

    /// Format of a file as detected by lofty.
    pub fn from_file_type(file_type: FileType) -> Option<Self> {
        match file_type {
            FileType::Flac => Some(ContainerFormat::Flac),
            FileType::Mpeg => Some(ContainerFormat::Mpeg),
            _ => None,
        }
    }

    /// The tag that carries embedded pictures for this container.
    pub fn picture_tag_type(self) -> TagType {
        match self {
            ContainerFormat::Flac => TagType::VorbisComments,
            ContainerFormat::Mpeg => TagType::Id3v2,
        }
    }
}

/// Normalized tag fields of one audio file.
///
/// Empty strings are folded into `None` and a track number of zero counts
/// as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFields {
    /// Tag title, or the file name without extension when the tag has none
    pub title: String,
    pub track_number: Option<u32>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl TagFields {
    /// Build fields from a tag, or `None` if the tag carries nothing usable.
    fn from_tag(tag: &Tag, path: &Path) -> Option<Self> {
        let title = non_empty(tag.title());
        let artist = non_empty(tag.artist());
        let album = non_empty(tag.album());
        let track_number = tag.track().filter(|&n| n != 0);

        let has_fields = title.is_some()
            || artist.is_some()
            || album.is_some()
            || track_number.is_some()
            || non_empty(tag.genre()).is_some()
            || non_empty(tag.comment()).is_some()
            || tag.year().is_some_and(|year| year != 0);
        if !has_fields {
            return None;
        }

        let title = title.unwrap_or_else(|| file_stem(path));
        Some(Self {
            title,
            track_number,
            artist,
            album,
        })
    }
}

fn non_empty(value: Option<Cow<'_, str>>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(Cow::into_owned)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read the tag fields of an audio file.
///
/// Returns `Ok(None)` when the file has no tag block or the tag has no
/// usable fields, and an error when the file can't be parsed as audio.
pub fn read(path: &Path) -> Result<Option<TagFields>> {
    let tagged_file = Probe::open(path)
        .and_then(|probe| probe.read())
        .map_err(|e| Error::metadata(path, e.to_string()))?;

    // Get the primary tag, or fall back to the first available tag
    let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    else {
        return Ok(None);
    };

    Ok(TagFields::from_tag(tag, path))
}
