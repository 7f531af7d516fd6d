//! Local playlist reconciliation.
//!
//! Before a local playlist is played its source folder is rescanned
//! and the cached file rewritten, so the playlist always reflects the
//! folder as it is now. Entries predating source tracking migrate
//! their scan folder from the playback path on first refresh.

use std::fs;
use std::path::{ Path, PathBuf };

use crate::catalog::CatalogKind;
use crate::m3u;
use crate::scanner;
use crate::store::{ PlaylistStore, StoreError };


/// Result of a refresh request.
///
/// Everything but `Refreshed` is a soft failure: the catalog and the
/// previous cache file are left untouched.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum RefreshOutcome {
    /// The source folder no longer exists.
    FolderMissing,

    /// The source folder holds no playable files.
    NoFilesFound,

    /// The cache file could not be rewritten; the previous playlist
    /// stays authoritative.
    WriteFailed,

    /// The playlist was regenerated and the catalog persisted.
    Refreshed {
        count: usize,
        /// True when the item count differs from the previous one,
        /// the signal for rebuilding dependent views. Equal-sized
        /// add/remove churn goes unnoticed; accepted as a cheap proxy.
        changed: bool,
        /// The internal cache path to hand to the player.
        path: PathBuf,
    },
}


/// Rescans a local entry's source folder and rewrites its playlist.
///
/// @param store - The catalog store; persisted on success
/// @param path - Playback path identifying the local entry
pub fn refresh_entry(
    store: &mut PlaylistStore,
    path: &Path,
) -> Result<RefreshOutcome, StoreError> {
    let entry = store.find( CatalogKind::Local, path )
        .ok_or_else( || StoreError::UnknownEntry( path.to_path_buf() ) )?;

    let folder = match &entry.scan_path {
        Some( folder ) => folder.clone(),
        None => {
            // Entries from before source tracking carry only the
            // playback path; its directory is the best guess we have.
            // One-time migration, recorded below on success.
            match path.parent() {
                Some( parent ) => {
                    tracing::info!(
                        "Migrating '{}' scan folder to {:?}", entry.title, parent
                    );
                    parent.to_path_buf()
                }
                None => return Ok( RefreshOutcome::FolderMissing ),
            }
        }
    };

    if !folder.exists() {
        return Ok( RefreshOutcome::FolderMissing );
    }

    let files = scanner::scan( &folder );
    if files.is_empty() {
        return Ok( RefreshOutcome::NoFilesFound );
    }

    let cache = store.cache_path( &entry.title );
    if let Err( e ) = fs::write( &cache, m3u::encode( &files ) ) {
        tracing::warn!( "Cache write failed for {:?}: {}", cache, e );
        return Ok( RefreshOutcome::WriteFailed );
    }

    let count = files.len();
    let ( changed, previous ) = match store.find_mut( CatalogKind::Local, path ) {
        Some( entry ) => {
            let previous = entry.path.clone();
            let changed = entry.count != count;
            entry.count = count;
            // Pinned internal from now on, even if the entry started
            // out pointing at an external file.
            entry.path = cache.clone();
            entry.scan_path = Some( folder );
            ( changed, previous )
        }
        None => return Err( StoreError::UnknownEntry( path.to_path_buf() ) ),
    };
    store.save( CatalogKind::Local )?;

    // A rename moves the derived cache name; drop the superseded file
    // so stray-file adoption cannot resurrect it later. Internal only.
    if previous != cache && store.is_internal( &previous ) && previous.exists() {
        if let Err( e ) = fs::remove_file( &previous ) {
            tracing::debug!( "Could not remove superseded cache {:?}: {}", previous, e );
        }
    }

    Ok( RefreshOutcome::Refreshed { count, changed, path: cache } )
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::catalog::PlaylistEntry;


    fn fixture() -> ( tempfile::TempDir, PlaylistStore, PathBuf ) {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join( "media" );
        fs::create_dir( &media ).unwrap();
        let store = PlaylistStore::new( dir.path().join( "data" ) ).unwrap();
        ( dir, store, media )
    }


    fn touch( path: &Path ) {
        fs::write( path, b"" ).unwrap();
    }


    fn local_document( store: &PlaylistStore ) -> String {
        fs::read_to_string( store.data_dir().join( "local-playlists.json" ) ).unwrap()
    }


    #[test]
    fn test_refresh_missing_folder_mutates_nothing() {
        let ( _dir, mut store, media ) = fixture();
        touch( &media.join( "a.mp4" ) );

        store.load();
        let files = scanner::scan( &media );
        let entry = store.create_local( "Trip", &media, &files ).unwrap();
        let document_before = local_document( &store );
        let cache_before = fs::read_to_string( &entry.path ).unwrap();

        fs::remove_dir_all( &media ).unwrap();

        let outcome = refresh_entry( &mut store, &entry.path ).unwrap();
        assert_eq!( outcome, RefreshOutcome::FolderMissing );

        let unchanged = store.find( CatalogKind::Local, &entry.path ).unwrap();
        assert_eq!( unchanged.count, 1 );
        assert_eq!( local_document( &store ), document_before );
        assert_eq!( fs::read_to_string( &entry.path ).unwrap(), cache_before );
    }


    #[test]
    fn test_refresh_empty_folder_mutates_nothing() {
        let ( _dir, mut store, media ) = fixture();
        touch( &media.join( "a.mp4" ) );

        store.load();
        let entry = store.create_local( "Trip", &media, &scanner::scan( &media ) ).unwrap();

        fs::remove_file( media.join( "a.mp4" ) ).unwrap();

        let outcome = refresh_entry( &mut store, &entry.path ).unwrap();
        assert_eq!( outcome, RefreshOutcome::NoFilesFound );
        assert_eq!( store.find( CatalogKind::Local, &entry.path ).unwrap().count, 1 );
    }


    #[test]
    fn test_refresh_same_count_raises_no_rebuild_signal() {
        let ( _dir, mut store, media ) = fixture();
        touch( &media.join( "a.mp4" ) );
        touch( &media.join( "b.mp4" ) );

        store.load();
        let entry = store.create_local( "Trip", &media, &scanner::scan( &media ) ).unwrap();

        match refresh_entry( &mut store, &entry.path ).unwrap() {
            RefreshOutcome::Refreshed { count, changed, .. } => {
                assert_eq!( count, 2 );
                assert!( !changed );
            }
            other => panic!( "unexpected outcome: {:?}", other ),
        }
    }


    #[test]
    fn test_refresh_new_count_updates_and_persists() {
        let ( _dir, mut store, media ) = fixture();
        touch( &media.join( "a.mp4" ) );

        store.load();
        let entry = store.create_local( "Trip", &media, &scanner::scan( &media ) ).unwrap();

        touch( &media.join( "b.mp4" ) );
        touch( &media.join( "c.mp4" ) );

        match refresh_entry( &mut store, &entry.path ).unwrap() {
            RefreshOutcome::Refreshed { count, changed, path } => {
                assert_eq!( count, 3 );
                assert!( changed );
                assert_eq!( path, entry.path );
            }
            other => panic!( "unexpected outcome: {:?}", other ),
        }

        assert_eq!( store.find( CatalogKind::Local, &entry.path ).unwrap().count, 3 );
        assert!( local_document( &store ).contains( "\"count\": 3" ) );

        let cache = fs::read_to_string( &entry.path ).unwrap();
        assert_eq!( m3u::count( &cache ), 3 );
    }


    #[test]
    fn test_refresh_migrates_legacy_entry() {
        let ( _dir, mut store, media ) = fixture();
        touch( &media.join( "a.mp4" ) );
        let external = media.join( "playlist.m3u8" );
        fs::write( &external, "#EXTM3U\n#EXTINF:-1, a\na.mp4" ).unwrap();

        store.load();
        // A legacy entry: external playback path, no recorded source
        let legacy = PlaylistEntry {
            title: "Old".to_string(),
            path: external.clone(),
            scan_path: None,
            count: 1,
        };
        push_local( &mut store, legacy );

        match refresh_entry( &mut store, &external ).unwrap() {
            RefreshOutcome::Refreshed { count, path, .. } => {
                assert_eq!( count, 1 );
                // pinned to the internal cache from now on
                assert!( store.is_internal( &path ) );

                let migrated = store.find( CatalogKind::Local, &path ).unwrap();
                assert_eq!( migrated.scan_path.as_deref(), Some( media.as_path() ) );
            }
            other => panic!( "unexpected outcome: {:?}", other ),
        }

        // the user's external file is untouched
        assert!( external.exists() );
    }


    #[test]
    fn test_refresh_write_failure_mutates_nothing() {
        let ( _dir, mut store, media ) = fixture();
        touch( &media.join( "a.mp4" ) );

        store.load();
        let entry = store.create_local( "Trip", &media, &scanner::scan( &media ) ).unwrap();

        // Occupy the cache path with a directory so the rewrite fails
        fs::remove_file( &entry.path ).unwrap();
        fs::create_dir( &entry.path ).unwrap();

        touch( &media.join( "b.mp4" ) );

        let outcome = refresh_entry( &mut store, &entry.path ).unwrap();
        assert_eq!( outcome, RefreshOutcome::WriteFailed );
        assert_eq!( store.find( CatalogKind::Local, &entry.path ).unwrap().count, 1 );
    }


    #[test]
    fn test_refresh_after_rename_moves_the_cache_file() {
        let ( _dir, mut store, media ) = fixture();
        touch( &media.join( "a.mp4" ) );

        store.load();
        let entry = store.create_local( "Trip", &media, &scanner::scan( &media ) ).unwrap();
        let old_cache = entry.path.clone();

        store.rename( CatalogKind::Local, &entry.path, "Road" ).unwrap();

        match refresh_entry( &mut store, &old_cache ).unwrap() {
            RefreshOutcome::Refreshed { path, .. } => {
                assert_eq!( path, store.cache_path( "Road" ) );
                assert!( path.exists() );
                // superseded cache is gone, so it cannot be adopted
                assert!( !old_cache.exists() );
            }
            other => panic!( "unexpected outcome: {:?}", other ),
        }
    }


    #[test]
    fn test_refresh_unknown_entry_is_an_error() {
        let ( _dir, mut store, _media ) = fixture();
        store.load();

        let missing = PathBuf::from( "/nowhere/list.m3u8" );
        assert!( matches!(
            refresh_entry( &mut store, &missing ),
            Err( StoreError::UnknownEntry( _ ) )
        ));
    }


    // Appends directly to the local catalog the way a legacy document
    // would have loaded it.
    fn push_local( store: &mut PlaylistStore, entry: PlaylistEntry ) {
        let json = serde_json::to_string_pretty( &vec![ entry ] ).unwrap();
        fs::write( store.data_dir().join( "local-playlists.json" ), json ).unwrap();
        store.load();
    }
}
