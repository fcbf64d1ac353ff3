//! midx - a music catalog indexer.
//!
//! Walks music directories, records every FLAC and MP3 file in a SQLite
//! catalog of directories, artists, albums and tracks, and keeps the first
//! embedded cover picture of each album in an on-disk art cache.

pub mod cli;
pub mod config;
pub mod cover;
pub mod db;
pub mod error;
pub mod library;
pub mod metadata;
pub mod model;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;
