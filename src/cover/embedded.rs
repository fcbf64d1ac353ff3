//! Extract cover art embedded in audio files.
//!
//! Dispatches on [`ContainerFormat`]:
//! - FLAC: the PICTURE block list, which lofty exposes on the Vorbis
//!   comments tag
//! - MP3: attached-picture (APIC) frames of the ID3v2 tag
//!
//! Other containers are never inspected.

use lofty::file::{TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use std::path::Path;

use crate::metadata::ContainerFormat;

/// Extract the raw bytes of the first embedded picture.
///
/// Returns None if the file can't be read, is not a supported container,
/// or has no picture.
pub fn extract_embedded_picture(path: &Path) -> Option<Vec<u8>> {
    let tagged_file = Probe::open(path).ok()?.read().ok()?;
    let format = ContainerFormat::from_file_type(tagged_file.file_type())?;

    match format {
        ContainerFormat::Flac => flac_picture(&tagged_file),
        ContainerFormat::Mpeg => id3v2_picture(&tagged_file),
    }
}

fn flac_picture(tagged_file: &TaggedFile) -> Option<Vec<u8>> {
    first_picture(tagged_file, ContainerFormat::Flac)
}

fn id3v2_picture(tagged_file: &TaggedFile) -> Option<Vec<u8>> {
    first_picture(tagged_file, ContainerFormat::Mpeg)
}

fn first_picture(tagged_file: &TaggedFile, format: ContainerFormat) -> Option<Vec<u8>> {
    let tag = tagged_file.tag(format.picture_tag_type())?;
    tag.pictures().first().map(|picture| picture.data().to_vec())
}
