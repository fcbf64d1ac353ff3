//! Catalog database: schema, identity resolution, queries and removal.
//!
//! Uses SQLx with SQLite for lightweight, embedded storage. The pool handle
//! is passed explicitly to every operation; there is no global catalog.
//!
//! - [`identity`]: get-or-create and key lookups for directories, artists,
//!   albums and track rows
//! - [`queries`]: read accessors consumed by front-ends
//! - [`removal`]: explicit per-track and per-directory deletion
//!
//! # Example
//!
//! ```ignore
//! use midx::db::{init_db, get_all_tracks};
//!
//! let pool = init_db("sqlite:midx.db").await?;
//! let tracks = get_all_tracks(&pool).await?;
//! ```

pub mod identity;
pub mod queries;
pub mod removal;

use std::path::Path;
use std::str::FromStr;

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use identity::{
    TrackRow, get_album_id, get_artist_id, get_music_dir_id, get_or_create_album,
    get_or_create_artist, get_or_create_track_row, get_track_id, register_music_dir,
    upsert_track_metadata,
};
pub use queries::{
    album_exists, artist_exists, get_album, get_all_albums, get_all_artists, get_all_music_dirs,
    get_all_tracks, get_artist, get_music_dir, get_track, get_track_ids_of_music_dir,
    get_track_metadata, music_dir_exists, track_exists,
};
pub use removal::{remove_music_dir, remove_music_dir_by_id, remove_track};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "midx.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and apply the catalog schema.
///
/// Creates the database file if it doesn't exist, enables foreign-key
/// enforcement on every pooled connection and runs all pending migrations.
/// Calling this on an existing catalog leaves its contents untouched.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let options = SqliteConnectOptions::from_str(db_url)?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Initialize the catalog or terminate the process.
///
/// Nothing else can run without a valid catalog, so a failure here is
/// logged with the underlying error code and message and the process exits
/// with status 1.
pub async fn init_db_or_exit(db_url: &str) -> SqlitePool {
    match init_db(db_url).await {
        Ok(pool) => pool,
        Err(e) => {
            let code = e
                .as_database_error()
                .and_then(|db_err| db_err.code())
                .map(|c| c.into_owned())
                .unwrap_or_else(|| "none".to_string());
            tracing::error!(target: "midx::catalog", url = db_url, code = %code, "Error initialising the catalog: {}", e);
            std::process::exit(1);
        }
    }
}
