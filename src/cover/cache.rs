//! Cover art disk cache.
//!
//! A flat directory of files named by decimal album id, with no extension.
//! The bytes are stored exactly as they were embedded in the audio file.
//! There is no eviction, size bound or checksum.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Cover art disk cache.
#[derive(Debug, Clone)]
pub struct ArtCache {
    cache_dir: PathBuf,
}

impl ArtCache {
    /// Create a new cache in the specified directory.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        // Ensure cache directory exists
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            tracing::warn!(target: "midx::art_cache", dir = %cache_dir.display(), "Could not create art cache directory: {}", e);
        }
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the cache entry for an album.
    pub fn path_for(&self, album_id: i64) -> PathBuf {
        self.cache_dir.join(album_id.to_string())
    }

    /// Check if an album has cached art.
    pub fn contains(&self, album_id: i64) -> bool {
        self.path_for(album_id).is_file()
    }

    /// Read the cached art bytes of an album.
    pub fn get(&self, album_id: i64) -> Option<Vec<u8>> {
        fs::read(self.path_for(album_id)).ok()
    }

    /// Store art for an album unless an entry already exists.
    ///
    /// Returns `Ok(true)` if the bytes were written and `Ok(false)` if the
    /// album already had an entry, which is left untouched. The bytes go to
    /// a temp file first and are renamed into place, so a failed write never
    /// leaves a partial entry behind.
    pub fn store_once(&self, album_id: i64, data: &[u8]) -> io::Result<bool> {
        let path = self.path_for(album_id);
        if path.exists() {
            return Ok(false);
        }

        let temp_path = self.cache_dir.join(format!("{}.tmp", album_id));
        if let Err(e) = write_new(&temp_path, data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        fs::rename(&temp_path, &path)?;
        Ok(true)
    }
}

/// Write `data` to `path`, replacing any leftover from an interrupted store.
fn write_new(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()
}
