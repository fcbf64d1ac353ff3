//! Test utilities and fixtures for midx tests.
//!
//! Provides a temporary catalog and writers for small but valid FLAC and
//! MP3 files, tagged through lofty so the bytes on disk match what real
//! taggers produce.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{temp_catalog, write_flac, FixtureTags};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, cache, dir) = temp_catalog().await;
//!     write_flac(&dir.path().join("a.flac"), &FixtureTags::default());
//! }
//! ```

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::{Accessor, Tag, TagExt, TagType};
use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::cover::ArtCache;

/// A 1x1 transparent PNG.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Creates a temporary database for testing.
///
/// Keep the returned `TempDir` alive for the duration of the test; the
/// database is deleted when it goes out of scope.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_url = crate::db::db_url(Some(&dir.path().join("test.db")));

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Creates a temporary database plus an art cache in `<tempdir>/art`.
pub async fn temp_catalog() -> (SqlitePool, ArtCache, TempDir) {
    let (pool, dir) = temp_db().await;
    let cache = ArtCache::new(dir.path().join("art"));
    (pool, cache, dir)
}

/// Tags to write into a fixture file. Unset fields are left out.
#[derive(Debug, Clone, Default)]
pub struct FixtureTags<'a> {
    pub title: Option<&'a str>,
    pub artist: Option<&'a str>,
    pub album: Option<&'a str>,
    pub track: Option<u32>,
    pub picture: Option<&'a [u8]>,
}

impl FixtureTags<'_> {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.track.is_none()
            && self.picture.is_none()
    }
}

/// Write a FLAC file with a STREAMINFO block and no audio frames, then tag it.
pub fn write_flac(path: &Path, tags: &FixtureTags<'_>) {
    let mut bytes = b"fLaC".to_vec();
    // Type 0 (STREAMINFO), 34 byte body; not the last block
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x22]);
    bytes.extend_from_slice(&4096u16.to_be_bytes());
    bytes.extend_from_slice(&4096u16.to_be_bytes());
    bytes.extend_from_slice(&[0; 6]);
    // 44.1kHz, 2 channels, 16 bits per sample, 0 samples
    let packed: u64 = (44_100u64 << 44) | (1u64 << 41) | (15u64 << 36);
    bytes.extend_from_slice(&packed.to_be_bytes());
    bytes.extend_from_slice(&[0; 16]);
    // Last-metadata-block flag, type 1 (PADDING), 4 byte body
    bytes.extend_from_slice(&[0x81, 0x00, 0x00, 0x04, 0, 0, 0, 0]);
    bytes.extend_from_slice(&[0; 64]);
    std::fs::write(path, bytes).expect("Failed to write FLAC fixture");

    apply_tags(path, TagType::VorbisComments, tags);
}

/// Write an MP3 file of a few silent MPEG-1 Layer III frames, then tag it.
pub fn write_mp3(path: &Path, tags: &FixtureTags<'_>) {
    // 128 kbps, 44.1kHz, no padding: 417 byte frames
    const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];
    const FRAME_LEN: usize = 417;

    let mut bytes = Vec::with_capacity(FRAME_LEN * 4);
    for _ in 0..4 {
        bytes.extend_from_slice(&FRAME_HEADER);
        bytes.resize(bytes.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
    }
    std::fs::write(path, bytes).expect("Failed to write MP3 fixture");

    apply_tags(path, TagType::Id3v2, tags);
}

fn apply_tags(path: &Path, tag_type: TagType, tags: &FixtureTags<'_>) {
    if tags.is_empty() {
        return;
    }

    let mut tag = Tag::new(tag_type);
    if let Some(title) = tags.title {
        tag.set_title(title.to_string());
    }
    if let Some(artist) = tags.artist {
        tag.set_artist(artist.to_string());
    }
    if let Some(album) = tags.album {
        tag.set_album(album.to_string());
    }
    if let Some(track) = tags.track {
        tag.set_track(track);
    }
    if let Some(data) = tags.picture {
        tag.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::Png),
            None,
            data.to_vec(),
        ));
    }

    tag.save_to_path(path, WriteOptions::default())
        .expect("Failed to write fixture tags");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        let tracks = crate::db::get_all_tracks(&pool).await.unwrap();
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_temp_catalog_creates_art_dir() {
        let (_pool, cache, dir) = temp_catalog().await;
        assert_eq!(cache.dir(), dir.path().join("art").as_path());
        assert!(cache.dir().is_dir());
    }

    #[test]
    fn test_tagged_flac_fixture_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.flac");
        write_flac(
            &path,
            &FixtureTags {
                title: Some("T"),
                album: Some("A"),
                ..Default::default()
            },
        );

        let fields = crate::metadata::read(&path).unwrap().unwrap();
        assert_eq!(fields.title, "T");
        assert_eq!(fields.album.as_deref(), Some("A"));
    }

    #[test]
    fn test_fixture_tags_default_is_empty() {
        assert!(FixtureTags::default().is_empty());
        assert!(
            !FixtureTags {
                track: Some(1),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
