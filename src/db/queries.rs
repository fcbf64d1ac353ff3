//! Read accessors over the catalog.
//!
//! These are the calls a front-end makes: list everything, fetch by id,
//! and cheap existence checks. All listings are ordered by id, which is
//! insertion order.

use sqlx::sqlite::SqlitePool;

use crate::model::{Album, Artist, MusicDirectory, Track, TrackMetadata, TrackWithMetadata};

/// Get all registered music directories.
pub async fn get_all_music_dirs(pool: &SqlitePool) -> sqlx::Result<Vec<MusicDirectory>> {
    sqlx::query_as::<_, MusicDirectory>("SELECT id, path FROM music_dirs ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Get all artists.
pub async fn get_all_artists(pool: &SqlitePool) -> sqlx::Result<Vec<Artist>> {
    sqlx::query_as::<_, Artist>("SELECT id, name FROM artists ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Get all albums.
pub async fn get_all_albums(pool: &SqlitePool) -> sqlx::Result<Vec<Album>> {
    sqlx::query_as::<_, Album>("SELECT id, name, artist_id FROM albums ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Get all tracks with their metadata.
///
/// Performs a LEFT JOIN so tracks without a metadata row are still
/// listed, with every metadata field set to `None`.
///
/// This is the primary method for loading the library for display.
pub async fn get_all_tracks(pool: &SqlitePool) -> sqlx::Result<Vec<TrackWithMetadata>> {
    sqlx::query_as::<_, TrackWithMetadata>(
        r#"
        SELECT
            t.id, t.file_path, t.parent_dir_id,
            tm.title, tm.track_number, tm.artist_id, tm.album_id
        FROM tracks t
        LEFT JOIN track_metadata tm ON t.id = tm.track_id
        ORDER BY t.id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_music_dir(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<MusicDirectory>> {
    sqlx::query_as::<_, MusicDirectory>("SELECT id, path FROM music_dirs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_artist(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Artist>> {
    sqlx::query_as::<_, Artist>("SELECT id, name FROM artists WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_album(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Album>> {
    sqlx::query_as::<_, Album>("SELECT id, name, artist_id FROM albums WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_track(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Track>> {
    sqlx::query_as::<_, Track>("SELECT id, file_path, parent_dir_id FROM tracks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Get the metadata row of a track, keyed by track id.
pub async fn get_track_metadata(
    pool: &SqlitePool,
    track_id: i64,
) -> sqlx::Result<Option<TrackMetadata>> {
    sqlx::query_as::<_, TrackMetadata>(
        "SELECT track_id, title, track_number, artist_id, album_id FROM track_metadata WHERE track_id = ?",
    )
    .bind(track_id)
    .fetch_optional(pool)
    .await
}

/// Ids of every track registered under a music directory.
pub async fn get_track_ids_of_music_dir(pool: &SqlitePool, dir_id: i64) -> sqlx::Result<Vec<i64>> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT id FROM tracks WHERE parent_dir_id = ? ORDER BY id")
            .bind(dir_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn music_dir_exists(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    exists(pool, "SELECT EXISTS(SELECT 1 FROM music_dirs WHERE id = ?)", id).await
}

pub async fn artist_exists(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    exists(pool, "SELECT EXISTS(SELECT 1 FROM artists WHERE id = ?)", id).await
}

pub async fn album_exists(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    exists(pool, "SELECT EXISTS(SELECT 1 FROM albums WHERE id = ?)", id).await
}

pub async fn track_exists(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    exists(pool, "SELECT EXISTS(SELECT 1 FROM tracks WHERE id = ?)", id).await
}

async fn exists(pool: &SqlitePool, sql: &'static str, id: i64) -> sqlx::Result<bool> {
    let (found,): (bool,) = sqlx::query_as(sql).bind(id).fetch_one(pool).await?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::identity::{
        get_or_create_album, get_or_create_artist, get_or_create_track_row, register_music_dir,
        upsert_track_metadata,
    };
    use crate::test_utils::temp_db;
    use std::fs::File;

    #[tokio::test]
    async fn test_get_all_tracks_includes_tracks_without_metadata() {
        let (pool, dir) = temp_db().await;
        File::create(dir.path().join("tagged.flac")).unwrap();
        File::create(dir.path().join("bare.flac")).unwrap();
        let dir_id = register_music_dir(&pool, dir.path()).await.unwrap().unwrap();

        let tagged = get_or_create_track_row(&pool, &dir.path().join("tagged.flac"), dir_id)
            .await
            .unwrap()
            .id()
            .unwrap();
        let bare = get_or_create_track_row(&pool, &dir.path().join("bare.flac"), dir_id)
            .await
            .unwrap()
            .id()
            .unwrap();

        let artist_id = get_or_create_artist(&pool, "Artist").await.unwrap();
        let album_id = get_or_create_album(&pool, "Album", artist_id).await.unwrap();
        upsert_track_metadata(
            &pool,
            &TrackMetadata {
                track_id: tagged,
                title: "Tagged".to_string(),
                track_number: Some(5),
                artist_id,
                album_id,
            },
        )
        .await
        .unwrap();

        let tracks = get_all_tracks(&pool).await.unwrap();
        assert_eq!(tracks.len(), 2);

        let tagged_row = tracks.iter().find(|t| t.id == tagged).unwrap();
        assert_eq!(tagged_row.title.as_deref(), Some("Tagged"));
        assert_eq!(tagged_row.track_number, Some(5));
        assert_eq!(tagged_row.album_id, album_id);

        let bare_row = tracks.iter().find(|t| t.id == bare).unwrap();
        assert_eq!(bare_row.title, None);
        assert_eq!(bare_row.track_number, None);
        assert_eq!(bare_row.artist_id, None);
        assert_eq!(bare_row.album_id, None);
        assert!(bare_row.metadata().is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_and_exists() {
        let (pool, _dir) = temp_db().await;
        let artist_id = get_or_create_artist(&pool, "Queen").await.unwrap().unwrap();
        let album_id = get_or_create_album(&pool, "Innuendo", Some(artist_id))
            .await
            .unwrap()
            .unwrap();

        let artist = get_artist(&pool, artist_id).await.unwrap().unwrap();
        assert_eq!(artist.name, "Queen");
        let album = get_album(&pool, album_id).await.unwrap().unwrap();
        assert_eq!(album.name, "Innuendo");
        assert_eq!(album.artist_id, Some(artist_id));

        assert!(artist_exists(&pool, artist_id).await.unwrap());
        assert!(album_exists(&pool, album_id).await.unwrap());
        assert!(!artist_exists(&pool, artist_id + 1).await.unwrap());
        assert!(!album_exists(&pool, album_id + 1).await.unwrap());
        assert!(!track_exists(&pool, 1).await.unwrap());
        assert!(!music_dir_exists(&pool, 1).await.unwrap());

        assert!(get_artist(&pool, 999).await.unwrap().is_none());
        assert!(get_track(&pool, 999).await.unwrap().is_none());
        assert!(get_track_metadata(&pool, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_track_ids_of_music_dir() {
        let (pool, dir) = temp_db().await;
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir(&a).unwrap();
        std::fs::create_dir(&b).unwrap();
        File::create(a.join("1.mp3")).unwrap();
        File::create(a.join("2.mp3")).unwrap();
        File::create(b.join("3.mp3")).unwrap();

        let a_id = register_music_dir(&pool, &a).await.unwrap().unwrap();
        let b_id = register_music_dir(&pool, &b).await.unwrap().unwrap();
        for (path, dir_id) in [(a.join("1.mp3"), a_id), (a.join("2.mp3"), a_id), (b.join("3.mp3"), b_id)] {
            get_or_create_track_row(&pool, &path, dir_id).await.unwrap();
        }

        assert_eq!(get_track_ids_of_music_dir(&pool, a_id).await.unwrap().len(), 2);
        assert_eq!(get_track_ids_of_music_dir(&pool, b_id).await.unwrap().len(), 1);
        let dir = get_music_dir(&pool, b_id).await.unwrap().unwrap();
        assert!(dir.path.ends_with("b"));
    }
}
