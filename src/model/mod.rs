//! Core data models for the music catalog.
//!
//! Defines the primary entities: [`MusicDirectory`], [`Artist`], [`Album`],
//! [`Track`] and [`TrackMetadata`]. These are derived from SQLx for database
//! mapping and from serde for the CLI's JSON output.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `music_dirs` - Registered library roots, unique by canonical path
//! - `artists` - Artist records with unique names
//! - `albums` - Albums, unique by (name, artist)
//! - `tracks` - Individual audio files, unique by canonical path
//! - `track_metadata` - Optional 1:1 tag data for a track

use serde::Serialize;
use sqlx::FromRow;

/// A registered library root.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct MusicDirectory {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Canonical absolute path (unique)
    pub path: String,
}

/// An artist in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Artist {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Artist name (unique, case-sensitive)
    pub name: String,
}

/// An album in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Album {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Album name
    pub name: String,
    /// Optional artist ID (albums can exist without artist)
    pub artist_id: Option<i64>,
}

/// A track (audio file) in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Track {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Canonical absolute file path (unique)
    pub file_path: String,
    /// Owning music directory
    pub parent_dir_id: i64,
}

/// Tag data extracted for a track.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct TrackMetadata {
    /// Track this metadata belongs to
    pub track_id: i64,
    /// Tag title, or the file stem when the tag has none
    pub title: String,
    /// Track number on album (never zero)
    pub track_number: Option<i64>,
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
}

/// A track row joined with its (possibly missing) metadata.
///
/// Produced by a LEFT JOIN, so every metadata column is optional.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct TrackWithMetadata {
    pub id: i64,
    pub file_path: String,
    pub parent_dir_id: i64,
    pub title: Option<String>,
    pub track_number: Option<i64>,
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
}

impl TrackWithMetadata {
    /// The metadata row, if the track has one.
    ///
    /// `title` is NOT NULL in the schema, so its presence marks a joined row.
    pub fn metadata(&self) -> Option<TrackMetadata> {
        self.title.as_ref().map(|title| TrackMetadata {
            track_id: self.id,
            title: title.clone(),
            track_number: self.track_number,
            artist_id: self.artist_id,
            album_id: self.album_id,
        })
    }
}
