//! Get-or-create and key lookups for catalog entities.
//!
//! Every get-or-create is a lookup, an `INSERT OR IGNORE`, and a second
//! lookup. If another writer inserted the same key in between, the ignored
//! insert leaves their row in place and the second lookup returns its id.
//!
//! Validation failures (missing paths, dangling foreign ids) are reported
//! as `Ok(None)`; only store-level failures surface as `Err`.

use std::path::Path;

use sqlx::sqlite::SqlitePool;

use super::queries::{artist_exists, music_dir_exists};
use crate::model::TrackMetadata;

/// Outcome of resolving a track row for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackRow {
    /// A new row was inserted for the file
    Created(i64),
    /// The file was already cataloged
    Existing(i64),
    /// Unknown directory id, or the path is not an existing regular file
    Invalid,
}

impl TrackRow {
    /// The track id, if one was resolved.
    pub fn id(self) -> Option<i64> {
        match self {
            TrackRow::Created(id) | TrackRow::Existing(id) => Some(id),
            TrackRow::Invalid => None,
        }
    }
}

/// Canonical absolute form of `path` as stored in the catalog.
///
/// `None` if the path does not exist or is not valid UTF-8. Paths are
/// stored as TEXT, so a non-UTF-8 path is logged and left out of the
/// catalog.
pub(crate) fn canonical_path(path: &Path) -> Option<String> {
    let canonical = std::fs::canonicalize(path).ok()?;
    let Some(text) = canonical.to_str() else {
        tracing::warn!(target: "midx::catalog", path = %canonical.display(), "Path is not valid UTF-8, not cataloged");
        return None;
    };
    Some(text.to_owned())
}

/// Look up a music directory by canonical path.
pub async fn get_music_dir_id(pool: &SqlitePool, path: &str) -> sqlx::Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM music_dirs WHERE path = ?")
        .bind(path)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(id,)| id))
}

/// Look up an artist by exact name.
pub async fn get_artist_id(pool: &SqlitePool, name: &str) -> sqlx::Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM artists WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(id,)| id))
}

/// Look up an album by name and artist.
///
/// `artist_id` is compared with `IS`, so `None` only matches albums that
/// have no artist.
pub async fn get_album_id(
    pool: &SqlitePool,
    name: &str,
    artist_id: Option<i64>,
) -> sqlx::Result<Option<i64>> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM albums WHERE name = ? AND artist_id IS ?")
            .bind(name)
            .bind(artist_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id,)| id))
}

/// Look up a track by canonical file path.
pub async fn get_track_id(pool: &SqlitePool, file_path: &str) -> sqlx::Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM tracks WHERE file_path = ?")
        .bind(file_path)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(id,)| id))
}

/// Register a library root.
///
/// Returns `None` if the path doesn't exist or is not a directory.
/// Equivalent paths (relative, through symlinks) resolve to the same row.
pub async fn register_music_dir(pool: &SqlitePool, path: &Path) -> sqlx::Result<Option<i64>> {
    if !path.is_dir() {
        tracing::warn!(target: "midx::catalog", path = %path.display(), "Path doesn't exist or is not a directory");
        return Ok(None);
    }
    let Some(abs_path) = canonical_path(path) else {
        tracing::warn!(target: "midx::catalog", path = %path.display(), "Could not canonicalize directory");
        return Ok(None);
    };

    if let Some(id) = get_music_dir_id(pool, &abs_path).await? {
        return Ok(Some(id));
    }

    sqlx::query("INSERT OR IGNORE INTO music_dirs (path) VALUES (?)")
        .bind(&abs_path)
        .execute(pool)
        .await?;

    let id = get_music_dir_id(pool, &abs_path).await?;
    if let Some(id) = id {
        tracing::info!(target: "midx::catalog", path = %abs_path, id, "Registered music directory");
    }
    Ok(id)
}

/// Get or create an artist by name.
///
/// Names are matched exactly: "ABBA" and "Abba" are different artists.
/// Returns `None` for an empty name.
pub async fn get_or_create_artist(pool: &SqlitePool, name: &str) -> sqlx::Result<Option<i64>> {
    if name.is_empty() {
        return Ok(None);
    }
    if let Some(id) = get_artist_id(pool, name).await? {
        return Ok(Some(id));
    }

    sqlx::query("INSERT OR IGNORE INTO artists (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    get_artist_id(pool, name).await
}

/// Get or create an album by name and artist.
///
/// The same name under a different artist, or under no artist, is a
/// different album. Returns `None` for an empty name or when `artist_id`
/// does not reference an existing artist; no row is created in that case.
pub async fn get_or_create_album(
    pool: &SqlitePool,
    name: &str,
    artist_id: Option<i64>,
) -> sqlx::Result<Option<i64>> {
    if name.is_empty() {
        return Ok(None);
    }
    if let Some(artist_id) = artist_id
        && !artist_exists(pool, artist_id).await?
    {
        tracing::debug!(target: "midx::catalog", album = name, artist_id, "Refusing album for unknown artist");
        return Ok(None);
    }

    if let Some(id) = get_album_id(pool, name, artist_id).await? {
        return Ok(Some(id));
    }

    sqlx::query("INSERT OR IGNORE INTO albums (name, artist_id) VALUES (?, ?)")
        .bind(name)
        .bind(artist_id)
        .execute(pool)
        .await?;

    get_album_id(pool, name, artist_id).await
}

/// Get or create the track row for a file, without reading its tags.
///
/// Tag extraction for newly created rows is driven by
/// [`crate::library::get_or_create_track`].
pub async fn get_or_create_track_row(
    pool: &SqlitePool,
    path: &Path,
    parent_dir_id: i64,
) -> sqlx::Result<TrackRow> {
    if !music_dir_exists(pool, parent_dir_id).await? {
        tracing::debug!(target: "midx::catalog", parent_dir_id, "Unknown music directory id");
        return Ok(TrackRow::Invalid);
    }
    let Some(abs_path) = canonical_path(path) else {
        tracing::warn!(target: "midx::catalog", path = %path.display(), "Path doesn't exist or is not valid UTF-8");
        return Ok(TrackRow::Invalid);
    };
    if !Path::new(&abs_path).is_file() {
        tracing::warn!(target: "midx::catalog", path = %abs_path, "Path is not a regular file");
        return Ok(TrackRow::Invalid);
    }

    if let Some(id) = get_track_id(pool, &abs_path).await? {
        return Ok(TrackRow::Existing(id));
    }

    let result = sqlx::query("INSERT OR IGNORE INTO tracks (file_path, parent_dir_id) VALUES (?, ?)")
        .bind(&abs_path)
        .bind(parent_dir_id)
        .execute(pool)
        .await?;

    match get_track_id(pool, &abs_path).await? {
        Some(id) if result.rows_affected() > 0 => Ok(TrackRow::Created(id)),
        Some(id) => Ok(TrackRow::Existing(id)),
        None => Ok(TrackRow::Invalid),
    }
}

/// Insert or replace the metadata row for a track.
pub async fn upsert_track_metadata(pool: &SqlitePool, meta: &TrackMetadata) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO track_metadata (track_id, title, track_number, artist_id, album_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(meta.track_id)
    .bind(&meta.title)
    .bind(meta.track_number)
    .bind(meta.artist_id)
    .bind(meta.album_id)
    .execute(pool)
    .await?;
    Ok(())
}
