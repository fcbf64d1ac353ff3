use futures::stream::Stream;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use walkdir::WalkDir;

use crate::metadata::ContainerFormat;

/// Check if a path names a file the indexer reads (`.flac` or `.mp3`,
/// case-sensitive).
pub fn is_supported_file(path: &Path) -> bool {
    ContainerFormat::from_path(path).is_some()
}

/// Scans the given root directory recursively for supported audio files.
///
/// Yields regular files (and symlinks to them) in filesystem traversal
/// order. Entries that can't be read are logged and skipped.
/// Returns a Stream of PathBufs.
pub fn scan(root: PathBuf) -> impl Stream<Item = PathBuf> {
    let (tx, rx) = mpsc::channel(100);

    // Spawn a blocking task to perform the synchronous file system traversal
    tokio::task::spawn_blocking(move || {
        for entry in WalkDir::new(&root).into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(target: "midx::scanner", "Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if is_supported_file(path) && path.is_file() {
                // If the receiver is dropped, blocking_send will return an
                // error, and we stop scanning.
                if tx.blocking_send(path.to_path_buf()).is_err() {
                    break;
                }
            }
        }
    });

    // Convert the mpsc Receiver into a Stream
    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|path| (path, rx))
    })
}
