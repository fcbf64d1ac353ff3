//! CLI command definitions and dispatch.
//!
//! Each group of subcommands is implemented in its own submodule:
//! - `scan`: directory scans and library rebuilds
//! - `catalog`: listings, removals, art lookup and config

mod catalog;
mod scan;

use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::cover::ArtCache;
use crate::db;

pub use catalog::{
    cmd_albums, cmd_art, cmd_artists, cmd_config, cmd_dirs, cmd_list, cmd_remove_dir,
    cmd_remove_track,
};
pub use scan::{cmd_rebuild, cmd_scan};

/// midx music catalog indexer
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog database file
    #[arg(long, global = true, env = "MIDX_DB")]
    pub db: Option<PathBuf>,

    /// Album art cache directory
    #[arg(long, global = true, env = "MIDX_ART_CACHE")]
    pub art_cache: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Register a directory and index the music beneath it
    Scan {
        /// Path to the directory to scan
        path: PathBuf,
    },
    /// Rescan every registered directory
    Rebuild,
    /// List all tracks in the catalog
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List registered music directories
    Dirs,
    /// List all artists
    Artists,
    /// List all albums
    Albums,
    /// Remove a music directory and all of its tracks
    RemoveDir {
        /// Path of the registered directory
        path: PathBuf,
    },
    /// Remove a single track
    RemoveTrack {
        /// Track id
        id: i64,
    },
    /// Print where an album's cached art lives, or copy it out
    Art {
        /// Album id
        album_id: i64,
        /// Copy the art to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config {
        /// Save it to the config file
        #[arg(long)]
        write: bool,
    },
}

impl Cli {
    /// The config file, with command-line and environment overrides applied.
    pub fn resolve_config(&self) -> Config {
        let mut config = match &self.config {
            Some(path) => config::load_from(path),
            None => config::load(),
        };
        if let Some(db) = &self.db {
            config.catalog.database = db.clone();
        }
        if let Some(art_cache) = &self.art_cache {
            config.catalog.art_cache = Some(art_cache.clone());
        }
        config
    }
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config();
    let rt = Runtime::new()?;

    match &cli.command {
        Commands::Scan { path } => cmd_scan(&rt, &config, path),
        Commands::Rebuild => cmd_rebuild(&rt, &config),
        Commands::List { json } => cmd_list(&rt, &config, *json),
        Commands::Dirs => cmd_dirs(&rt, &config),
        Commands::Artists => cmd_artists(&rt, &config),
        Commands::Albums => cmd_albums(&rt, &config),
        Commands::RemoveDir { path } => cmd_remove_dir(&rt, &config, path),
        Commands::RemoveTrack { id } => cmd_remove_track(&rt, &config, *id),
        Commands::Art { album_id, output } => cmd_art(&config, *album_id, output.as_deref()),
        Commands::Config { write } => cmd_config(&config, cli.config.as_deref(), *write),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Open the catalog and art cache named by `config`.
///
/// Exits the process if the database can't be initialised.
pub(crate) async fn open_catalog(config: &Config) -> anyhow::Result<(SqlitePool, ArtCache)> {
    let database = &config.catalog.database;
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let pool = db::init_db_or_exit(&db::db_url(Some(database))).await;
    let cache = ArtCache::new(config.catalog.art_cache_dir());
    Ok((pool, cache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["midx", "scan", "/music"]).unwrap();
        assert!(matches!(cli.command, Commands::Scan { ref path } if path == &PathBuf::from("/music")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["midx", "list", "--json", "--db", "/tmp/x.db"]).unwrap();
        assert!(matches!(cli.command, Commands::List { json: true }));
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn test_art_requires_numeric_id() {
        assert!(Cli::try_parse_from(["midx", "art", "cover"]).is_err());
        let cli = Cli::try_parse_from(["midx", "art", "7", "-o", "out.png"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Art { album_id: 7, output: Some(_) }
        ));
    }

    #[test]
    fn test_resolve_config_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "[catalog]\ndatabase = \"/from/file.db\"\nart_cache = \"/from/file/art\"\n",
        )
        .unwrap();
        let config_arg = config_file.to_str().unwrap();

        let cli = Cli::try_parse_from(["midx", "--config", config_arg, "dirs"]).unwrap();
        let config = cli.resolve_config();
        assert_eq!(config.catalog.database, PathBuf::from("/from/file.db"));
        assert_eq!(config.catalog.art_cache_dir(), PathBuf::from("/from/file/art"));

        let cli = Cli::try_parse_from([
            "midx",
            "--config",
            config_arg,
            "--art-cache",
            "/override/art",
            "dirs",
        ])
        .unwrap();
        let config = cli.resolve_config();
        assert_eq!(config.catalog.database, PathBuf::from("/from/file.db"));
        assert_eq!(config.catalog.art_cache_dir(), PathBuf::from("/override/art"));
    }

    #[test]
    fn test_art_cache_defaults_next_to_db_flag() {
        let dir = tempfile::tempdir().unwrap();
        let config_arg = dir.path().join("absent.toml");
        let cli = Cli::try_parse_from([
            "midx",
            "--config",
            config_arg.to_str().unwrap(),
            "--db",
            "/data/midx/catalog.db",
            "dirs",
        ])
        .unwrap();

        let config = cli.resolve_config();
        assert_eq!(config.catalog.art_cache_dir(), PathBuf::from("/data/midx/art"));
    }

    #[tokio::test]
    async fn test_open_catalog_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.catalog.database = dir.path().join("a").join("b").join("catalog.db");

        let (pool, cache) = open_catalog(&config).await.unwrap();
        assert!(config.catalog.database.is_file());
        assert_eq!(cache.dir(), dir.path().join("a").join("b").join("art").as_path());
        assert!(cache.dir().is_dir());
        assert!(db::get_all_music_dirs(&pool).await.unwrap().is_empty());
    }
}
