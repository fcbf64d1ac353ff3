//! Catalog listing, removal and art lookup commands.

use std::path::Path;

use tokio::runtime::Runtime;

use super::open_catalog;
use crate::config::{self, Config};
use crate::cover::ArtCache;
use crate::db;
use crate::error::{Error, ResultExt};

/// List all tracks in the catalog
pub fn cmd_list(rt: &Runtime, config: &Config, json: bool) -> anyhow::Result<()> {
    rt.block_on(async {
        let (pool, _) = open_catalog(config).await?;
        let tracks = db::get_all_tracks(&pool).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&tracks)?);
            return anyhow::Ok(());
        }

        for track in tracks {
            let number = track
                .track_number
                .map(|n| format!("{:02}", n))
                .unwrap_or_else(|| "--".to_string());
            let title = track.title.as_deref().unwrap_or("<no metadata>");
            println!("{:>6}  {}  {} - {}", track.id, number, title, track.file_path);
        }
        anyhow::Ok(())
    })
}

/// List registered music directories
pub fn cmd_dirs(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let (pool, _) = open_catalog(config).await?;
        for dir in db::get_all_music_dirs(&pool).await? {
            let tracks = db::get_track_ids_of_music_dir(&pool, dir.id).await?;
            println!("{:>6}  {} ({} tracks)", dir.id, dir.path, tracks.len());
        }
        anyhow::Ok(())
    })
}

/// List all artists
pub fn cmd_artists(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let (pool, _) = open_catalog(config).await?;
        for artist in db::get_all_artists(&pool).await? {
            println!("{:>6}  {}", artist.id, artist.name);
        }
        anyhow::Ok(())
    })
}

/// List all albums with their artist, if any
pub fn cmd_albums(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let (pool, cache) = open_catalog(config).await?;
        for album in db::get_all_albums(&pool).await? {
            let artist = match album.artist_id {
                Some(id) => db::get_artist(&pool, id).await?.map(|a| a.name),
                None => None,
            };
            let art = if cache.contains(album.id) { " [art]" } else { "" };
            println!(
                "{:>6}  {} - {}{}",
                album.id,
                artist.as_deref().unwrap_or("<unknown artist>"),
                album.name,
                art
            );
        }
        anyhow::Ok(())
    })
}

/// Remove a registered directory with its tracks and metadata
pub fn cmd_remove_dir(rt: &Runtime, config: &Config, path: &Path) -> anyhow::Result<()> {
    rt.block_on(async {
        let (pool, _) = open_catalog(config).await?;

        let removed = if path.is_dir() {
            db::remove_music_dir(&pool, path).await?
        } else {
            // The directory may be gone from disk; match the stored path as given
            match path.to_str() {
                Some(stored) => match db::get_music_dir_id(&pool, stored).await? {
                    Some(id) => db::remove_music_dir_by_id(&pool, id).await?,
                    None => false,
                },
                None => false,
            }
        };

        if !removed {
            anyhow::bail!("Not a registered music directory: {}", path.display());
        }
        println!("Removed {}", path.display());
        anyhow::Ok(())
    })
}

/// Remove one track and its metadata
pub fn cmd_remove_track(rt: &Runtime, config: &Config, id: i64) -> anyhow::Result<()> {
    rt.block_on(async {
        let (pool, _) = open_catalog(config).await?;
        if !db::remove_track(&pool, id).await? {
            return Err(Error::not_found(format!("track {}", id)).into());
        }
        println!("Removed track {}", id);
        anyhow::Ok(())
    })
}

/// Print the cache path of an album's art, or copy the art to `output`
pub fn cmd_art(config: &Config, album_id: i64, output: Option<&Path>) -> anyhow::Result<()> {
    let cache = ArtCache::new(config.catalog.art_cache_dir());
    let Some(data) = cache.get(album_id) else {
        return Err(Error::not_found(format!("art for album {}", album_id)).into());
    };

    match output {
        Some(output) => {
            std::fs::write(output, &data)
                .with_context(format!("writing art to {}", output.display()))?;
            println!("Wrote {} bytes to {}", data.len(), output.display());
        }
        None => println!("{}", cache.path_for(album_id).display()),
    }
    Ok(())
}

/// Print the effective configuration, optionally saving it
pub fn cmd_config(config: &Config, config_file: Option<&Path>, write: bool) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);

    if write {
        let path = match config_file {
            Some(path) => {
                config::save_to(config, path)?;
                path.to_path_buf()
            }
            None => config::save(config)?,
        };
        eprintln!("Saved to {}", path.display());
    }
    Ok(())
}
