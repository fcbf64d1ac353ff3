//! Explicit removal of tracks and music directories.
//!
//! Removal touches only tracks and their metadata. Artist and album rows
//! stay, and so do cached cover images.

use std::path::Path;

use sqlx::sqlite::SqlitePool;

use super::identity::{canonical_path, get_music_dir_id};

/// Remove a track and its metadata.
///
/// Returns `false` if no track has this id.
pub async fn remove_track(pool: &SqlitePool, track_id: i64) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM track_metadata WHERE track_id = ?")
        .bind(track_id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(track_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a registered music directory by path, with all of its tracks.
///
/// Returns `false` if the path doesn't exist, is not a directory, or was
/// never registered.
pub async fn remove_music_dir(pool: &SqlitePool, path: &Path) -> sqlx::Result<bool> {
    if !path.is_dir() {
        tracing::warn!(target: "midx::catalog", path = %path.display(), "Path doesn't exist or is not a directory");
        return Ok(false);
    }
    let Some(abs_path) = canonical_path(path) else {
        return Ok(false);
    };
    let Some(dir_id) = get_music_dir_id(pool, &abs_path).await? else {
        tracing::warn!(target: "midx::catalog", path = %abs_path, "Trying to remove a directory that is not in the catalog");
        return Ok(false);
    };
    remove_music_dir_by_id(pool, dir_id).await
}

/// Remove a music directory by id, with all of its tracks.
///
/// Works for roots that have since disappeared from disk.
pub async fn remove_music_dir_by_id(pool: &SqlitePool, dir_id: i64) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    let metadata = sqlx::query(
        r#"
        DELETE FROM track_metadata
        WHERE track_id IN (SELECT id FROM tracks WHERE parent_dir_id = ?)
        "#,
    )
    .bind(dir_id)
    .execute(&mut *tx)
    .await?;
    let tracks = sqlx::query("DELETE FROM tracks WHERE parent_dir_id = ?")
        .bind(dir_id)
        .execute(&mut *tx)
        .await?;
    let dirs = sqlx::query("DELETE FROM music_dirs WHERE id = ?")
        .bind(dir_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let removed = dirs.rows_affected() > 0;
    if removed {
        tracing::info!(
            target: "midx::catalog",
            dir_id,
            tracks = tracks.rows_affected(),
            metadata = metadata.rows_affected(),
            "Removed music directory"
        );
    }
    Ok(removed)
}
