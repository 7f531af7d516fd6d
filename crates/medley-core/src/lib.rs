//! Medley Core - Playlist catalog and folder-sync engine
//!
//! This crate provides the core functionality for the playlist shelf:
//! media discovery, M3U generation, the two playlist catalogs with
//! their JSON persistence, and the refresh protocol that keeps local
//! playlists synchronized with their source folders.

pub mod catalog;
pub mod m3u;
pub mod paths;
pub mod refresh;
pub mod scanner;
pub mod store;

pub use catalog::{ CatalogKind, PlaylistEntry };
pub use refresh::RefreshOutcome;
pub use store::{ PlaylistStore, StoreError };
