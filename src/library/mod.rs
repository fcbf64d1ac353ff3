//! Library indexing: track creation with tag extraction, directory scans
//! and full rebuilds.
//!
//! Scans are sequential. Each file is resolved, tagged and committed before
//! the next one is read, so the scan is the only writer while it runs. A
//! failure on one file is reported as a [`ScanEvent::Error`] and the walk
//! goes on.
//!
//! Rescans never re-read tags of tracks already in the catalog and never
//! drop tracks whose files have disappeared.

use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::cover::{self, ArtCache};
use crate::db::{self, TrackRow};
use crate::error::{Result, ResultExt};
use crate::metadata;
use crate::model::TrackMetadata;
use crate::scanner;

#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// The file has a track row; `created` is false if it already had one
    Indexed {
        path: PathBuf,
        track_id: i64,
        created: bool,
    },
    /// The file vanished mid-scan, or its path is not valid UTF-8
    Skipped(PathBuf),
    Error(PathBuf, String),
}

/// Counts of one directory scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub dir_id: i64,
    pub root: PathBuf,
    /// Files with a track row after the scan
    pub indexed: usize,
    /// Of those, files seen for the first time
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ScanSummary {
    pub fn new(dir_id: i64, root: PathBuf) -> Self {
        Self {
            dir_id,
            root,
            ..Default::default()
        }
    }

    pub fn record(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::Indexed { created, .. } => {
                self.indexed += 1;
                if *created {
                    self.created += 1;
                }
            }
            ScanEvent::Skipped(_) => self.skipped += 1,
            ScanEvent::Error(..) => self.failed += 1,
        }
    }
}

/// Extract metadata for a track that already has a catalog row.
///
/// Returns `None` if the track id is unknown, or the file has no readable
/// tag block with usable fields. Artist and album are resolved to ids,
/// creating rows as needed, and the album's cover art is cached the first
/// time one of its tracks is seen.
pub async fn load_metadata(
    pool: &SqlitePool,
    cache: &ArtCache,
    track_id: i64,
    path: &Path,
) -> Result<Option<TrackMetadata>> {
    if !db::track_exists(pool, track_id).await? {
        return Ok(None);
    }

    let fields = match metadata::read(path) {
        Ok(Some(fields)) => fields,
        Ok(None) => {
            tracing::debug!(target: "midx::scanner", path = %path.display(), "No usable tags");
            return Ok(None);
        }
        Err(e) => {
            tracing::debug!(target: "midx::scanner", "Unreadable tags: {}", e);
            return Ok(None);
        }
    };

    let artist_id = match fields.artist.as_deref() {
        Some(name) => db::get_or_create_artist(pool, name).await?,
        None => None,
    };
    let album_id = match fields.album.as_deref() {
        Some(name) => db::get_or_create_album(pool, name, artist_id).await?,
        None => None,
    };

    if let Some(album_id) = album_id {
        fill_album_art(cache, album_id, path);
    }

    Ok(Some(TrackMetadata {
        track_id,
        title: fields.title,
        track_number: fields.track_number.map(i64::from),
        artist_id,
        album_id,
    }))
}

/// Cache the embedded picture of `path` for an album that has no art yet.
fn fill_album_art(cache: &ArtCache, album_id: i64, path: &Path) {
    if cache.contains(album_id) {
        return;
    }
    let Some(data) = cover::extract_embedded_picture(path) else {
        return;
    };
    match cache.store_once(album_id, &data) {
        Ok(true) => {
            tracing::debug!(target: "midx::art_cache", album_id, bytes = data.len(), "Cached album art")
        }
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(target: "midx::art_cache", album_id, "Failed to cache album art: {}", e)
        }
    }
}

/// Resolve the track row of a file, extracting its metadata if the row is new.
async fn index_track(
    pool: &SqlitePool,
    cache: &ArtCache,
    path: &Path,
    dir_id: i64,
) -> Result<TrackRow> {
    let row = db::get_or_create_track_row(pool, path, dir_id).await?;
    if let TrackRow::Created(track_id) = row
        && let Some(meta) = load_metadata(pool, cache, track_id, path).await?
    {
        db::upsert_track_metadata(pool, &meta).await?;
    }
    Ok(row)
}

/// Get or create the track for a file.
///
/// Returns `None` if `dir_id` is not a registered directory or the path is
/// not an existing regular file. A newly created track has its tags read
/// right away; an existing one is returned as is.
pub async fn get_or_create_track(
    pool: &SqlitePool,
    cache: &ArtCache,
    path: &Path,
    dir_id: i64,
) -> Result<Option<i64>> {
    Ok(index_track(pool, cache, path, dir_id).await?.id())
}

/// Index every supported file under `root` into the directory `dir_id`.
/// Returns a stream of ScanEvents.
pub fn scan_library(
    pool: SqlitePool,
    cache: ArtCache,
    dir_id: i64,
    root: PathBuf,
) -> impl Stream<Item = ScanEvent> {
    scanner::scan(root).then(move |path| {
        let pool = pool.clone();
        let cache = cache.clone();
        async move {
            match index_track(&pool, &cache, &path, dir_id).await {
                Ok(TrackRow::Created(track_id)) => ScanEvent::Indexed {
                    path,
                    track_id,
                    created: true,
                },
                Ok(TrackRow::Existing(track_id)) => ScanEvent::Indexed {
                    path,
                    track_id,
                    created: false,
                },
                Ok(TrackRow::Invalid) => ScanEvent::Skipped(path),
                Err(e) => ScanEvent::Error(path, e.to_string()),
            }
        }
    })
}

/// Register `root` as a music directory and index everything beneath it.
///
/// Returns `None` if `root` doesn't exist or is not a directory.
pub async fn scan_directory(
    pool: &SqlitePool,
    cache: &ArtCache,
    root: &Path,
) -> Result<Option<ScanSummary>> {
    scan_directory_with(pool, cache, root, |_, _| {}).await
}

/// Like [`scan_directory`], calling `on_event` after each file with the
/// event and the running summary.
pub async fn scan_directory_with<F>(
    pool: &SqlitePool,
    cache: &ArtCache,
    root: &Path,
    mut on_event: F,
) -> Result<Option<ScanSummary>>
where
    F: FnMut(&ScanEvent, &ScanSummary),
{
    let Some(dir_id) = db::register_music_dir(pool, root).await? else {
        return Ok(None);
    };
    let root = std::fs::canonicalize(root)
        .with_context(format!("resolving {}", root.display()))?;
    tracing::info!(target: "midx::scanner", root = %root.display(), dir_id, "Scanning directory");

    let mut summary = ScanSummary::new(dir_id, root.clone());
    let events = scan_library(pool.clone(), cache.clone(), dir_id, root);
    let mut events = std::pin::pin!(events);

    while let Some(event) = events.next().await {
        summary.record(&event);
        match &event {
            ScanEvent::Indexed {
                path,
                created: true,
                ..
            } => {
                tracing::info!(target: "midx::scanner", "{} - INSERTED: {}", summary.created, path.display())
            }
            ScanEvent::Indexed { path, .. } => {
                tracing::debug!(target: "midx::scanner", "Already indexed: {}", path.display())
            }
            ScanEvent::Skipped(path) => {
                tracing::debug!(target: "midx::scanner", "Skipped: {}", path.display())
            }
            ScanEvent::Error(path, e) => {
                tracing::warn!(target: "midx::scanner", "Error processing {}: {}", path.display(), e)
            }
        }
        on_event(&event, &summary);
    }

    tracing::info!(
        target: "midx::scanner",
        dir_id,
        indexed = summary.indexed,
        created = summary.created,
        failed = summary.failed,
        "Scan complete"
    );
    Ok(Some(summary))
}

/// Rescan every registered music directory, in registration order.
///
/// Directories that are no longer available on disk are logged and left
/// in the catalog.
pub async fn rebuild_library(pool: &SqlitePool, cache: &ArtCache) -> Result<Vec<ScanSummary>> {
    let dirs = db::get_all_music_dirs(pool)
        .await
        .with_context("listing music directories")?;
    let mut summaries = Vec::with_capacity(dirs.len());

    for dir in dirs {
        match scan_directory(pool, cache, Path::new(&dir.path)).await? {
            Some(summary) => summaries.push(summary),
            None => {
                tracing::warn!(target: "midx::scanner", path = %dir.path, "Registered directory is not available")
            }
        }
    }

    Ok(summaries)
}
