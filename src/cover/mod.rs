//! Album cover art: embedded picture extraction and the on-disk cache.
//!
//! The indexer fills the cache once per album while scanning; front-ends
//! only read from it.
//!
//! # Design Principles
//!
//! - **Keyed by album id**: one file per album, named by its decimal id
//! - **Write once**: an existing entry is never overwritten
//! - **Graceful degradation**: missing art is fine, lookups just return None

mod cache;
mod embedded;

pub use cache::ArtCache;
pub use embedded::extract_embedded_picture;
