//! Playlist catalog store.
//!
//! Owns the online and local catalogs, their JSON persistence, and the
//! playlist files generated under the data directory. Every mutation
//! is applied in memory and then the whole catalog document is written
//! back, so the documents always mirror the last completed operation.

use std::fs;
use std::path::{ Path, PathBuf };

use thiserror::Error;

use crate::catalog::{ ensure_unique_title, CatalogKind, PlaylistEntry };
use crate::m3u;
use crate::paths;


const ONLINE_FILE: &str = "online-playlists.json";
const LOCAL_FILE: &str = "local-playlists.json";


/// Errors that can occur with store operations.
#[derive( Debug, Error )]
pub enum StoreError {
    #[error( "IO error: {0}" )]
    Io( #[from] std::io::Error ),

    #[error( "JSON error: {0}" )]
    Json( #[from] serde_json::Error ),

    #[error( "No playlist entry for path: {0}" )]
    UnknownEntry( PathBuf ),
}


/// The two playlist catalogs and their backing files.
#[derive( Debug )]
pub struct PlaylistStore {
    data_dir: PathBuf,
    online: Vec<PlaylistEntry>,
    local: Vec<PlaylistEntry>,
}


impl PlaylistStore {
    /// Creates a store rooted at `data_dir`, creating the directory if
    /// needed. Catalogs start empty; call [`load`](Self::load).
    pub fn new( data_dir: PathBuf ) -> Result<Self, StoreError> {
        fs::create_dir_all( &data_dir )?;
        Ok( Self {
            data_dir,
            online: Vec::new(),
            local: Vec::new(),
        })
    }


    /// Gets the private data directory.
    pub fn data_dir( &self ) -> &Path {
        &self.data_dir
    }


    /// Gets the entries of one catalog, in stored order.
    pub fn entries( &self, kind: CatalogKind ) -> &[PlaylistEntry] {
        self.catalog( kind )
    }


    /// Finds an entry by its playback path.
    pub fn find( &self, kind: CatalogKind, path: &Path ) -> Option<&PlaylistEntry> {
        self.catalog( kind ).iter().find( |e| e.path == path )
    }


    /// True if `path` lives under the private data directory.
    ///
    /// Only files in there are ever deleted or overwritten by the
    /// store; external files the user pointed at are left alone.
    pub fn is_internal( &self, path: &Path ) -> bool {
        path.starts_with( &self.data_dir )
    }


    /// Derives the internal playlist filename for a title.
    ///
    /// Stable: the same title always maps to the same filename, so
    /// repeated refreshes overwrite instead of accumulating files.
    pub fn cache_filename( title: &str ) -> String {
        format!( "local_{}.m3u8", title_slug( title ) )
    }


    /// Full internal cache path for a title.
    pub fn cache_path( &self, title: &str ) -> PathBuf {
        self.data_dir.join( Self::cache_filename( title ) )
    }


    /// Loads both catalogs from disk.
    ///
    /// A missing or malformed document loads as an empty catalog; a
    /// corrupted file never prevents startup.
    pub fn load( &mut self ) {
        self.online = Self::load_catalog( &self.data_dir.join( ONLINE_FILE ) );
        self.local = Self::load_catalog( &self.data_dir.join( LOCAL_FILE ) );
    }


    fn load_catalog( path: &Path ) -> Vec<PlaylistEntry> {
        if !path.exists() {
            return Vec::new();
        }

        match fs::read_to_string( path ) {
            Ok( text ) => match serde_json::from_str( &text ) {
                Ok( entries ) => entries,
                Err( e ) => {
                    tracing::warn!( "Malformed catalog {:?}, starting empty: {}", path, e );
                    Vec::new()
                }
            },
            Err( e ) => {
                tracing::warn!( "Cannot read catalog {:?}, starting empty: {}", path, e );
                Vec::new()
            }
        }
    }


    /// Folds stray playlist files in the data directory into the local
    /// catalog, recovering their item counts from the file contents.
    ///
    /// @returns How many files were adopted
    pub fn adopt_orphans( &mut self ) -> Result<usize, StoreError> {
        let entries = match fs::read_dir( &self.data_dir ) {
            Ok( entries ) => entries,
            Err( e ) => {
                tracing::warn!( "Cannot list data dir {:?}: {}", self.data_dir, e );
                return Ok( 0 );
            }
        };

        let mut strays: Vec<PathBuf> = entries.flatten()
            .map( |e| e.path() )
            .filter( |p| p.extension().and_then( |e| e.to_str() ) == Some( "m3u8" ) )
            .filter( |p| !self.is_referenced( p ) )
            .collect();
        strays.sort();

        let mut adopted = 0;
        for path in strays {
            let text = match fs::read_to_string( &path ) {
                Ok( text ) => text,
                Err( e ) => {
                    tracing::warn!( "Cannot read stray playlist {:?}: {}", path, e );
                    continue;
                }
            };

            let stem = path.file_stem()
                .and_then( |s| s.to_str() )
                .unwrap_or( "playlist" );
            let base = stem.strip_prefix( "local_" ).unwrap_or( stem );
            let title = self.unique_title( CatalogKind::Local, base );

            tracing::info!( "Adopting stray playlist {:?} as '{}'", path, title );
            self.local.push( PlaylistEntry {
                title,
                path,
                scan_path: None,
                count: m3u::count( &text ),
            });
            adopted += 1;
        }

        if adopted > 0 {
            self.save( CatalogKind::Local )?;
        }
        Ok( adopted )
    }


    /// Creates an online playlist from a list of URLs.
    ///
    /// Writes the generated file under the data directory and appends
    /// the new entry to the online catalog.
    pub fn create_online(
        &mut self,
        title: &str,
        urls: &[String],
    ) -> Result<PlaylistEntry, StoreError> {
        let title = self.unique_title( CatalogKind::Online, title );
        let cache = self.cache_path( &title );

        let items: Vec<( String, String )> = urls.iter()
            .map( |u| ( paths::url_title( u ), u.clone() ) )
            .collect();
        fs::write( &cache, m3u::encode_annotated( &items ) )?;

        let entry = PlaylistEntry {
            title,
            path: cache,
            scan_path: None,
            count: urls.len(),
        };
        self.online.push( entry.clone() );
        self.save( CatalogKind::Online )?;
        Ok( entry )
    }


    /// Creates a local playlist from an already-scanned folder.
    ///
    /// The playlist is written under the data directory and tracked
    /// from there; a companion copy is also attempted next to the
    /// media, with the result ignored (sandboxed folders may refuse
    /// the write).
    pub fn create_local(
        &mut self,
        title: &str,
        folder: &Path,
        files: &[PathBuf],
    ) -> Result<PlaylistEntry, StoreError> {
        let title = self.unique_title( CatalogKind::Local, title );
        let content = m3u::encode( files );

        let external = folder.join( "playlist.m3u8" );
        if let Err( e ) = fs::write( &external, &content ) {
            tracing::debug!( "Skipping companion playlist {:?}: {}", external, e );
        }

        let cache = self.cache_path( &title );
        fs::write( &cache, &content )?;

        let entry = PlaylistEntry {
            title,
            path: cache,
            scan_path: Some( folder.to_path_buf() ),
            count: files.len(),
        };
        self.local.push( entry.clone() );
        self.save( CatalogKind::Local )?;
        Ok( entry )
    }


    /// Re-titles the entry at `path`.
    ///
    /// Uniqueness is enforced against the other entries, so renaming
    /// an entry to its current title is a no-op. The cached file keeps
    /// its old name until the next refresh regenerates it.
    ///
    /// @returns The title actually applied
    pub fn rename(
        &mut self,
        kind: CatalogKind,
        path: &Path,
        new_title: &str,
    ) -> Result<String, StoreError> {
        let others: Vec<String> = self.catalog( kind ).iter()
            .filter( |e| e.path != path )
            .map( |e| e.title.clone() )
            .collect();
        let title = ensure_unique_title( others.iter().map( String::as_str ), new_title );

        match self.catalog_mut( kind ).iter_mut().find( |e| e.path == path ) {
            Some( entry ) => entry.title = title.clone(),
            None => return Err( StoreError::UnknownEntry( path.to_path_buf() ) ),
        }

        self.save( kind )?;
        Ok( title )
    }


    /// Removes the entry at `path` and its backing file where owned.
    pub fn delete( &mut self, kind: CatalogKind, path: &Path ) -> Result<(), StoreError> {
        let position = self.catalog( kind ).iter()
            .position( |e| e.path == path )
            .ok_or_else( || StoreError::UnknownEntry( path.to_path_buf() ) )?;

        let entry = self.catalog_mut( kind ).remove( position );
        self.remove_backing_file( kind, &entry );
        self.save( kind )
    }


    /// Removes every entry of one catalog and the backing files owned
    /// by the store.
    pub fn delete_all( &mut self, kind: CatalogKind ) -> Result<(), StoreError> {
        let entries = std::mem::take( self.catalog_mut( kind ) );
        for entry in &entries {
            self.remove_backing_file( kind, entry );
        }
        self.save( kind )
    }


    /// Persists one catalog as a pretty-printed JSON document.
    pub( crate ) fn save( &self, kind: CatalogKind ) -> Result<(), StoreError> {
        let ( file, entries ) = match kind {
            CatalogKind::Online => ( ONLINE_FILE, &self.online ),
            CatalogKind::Local => ( LOCAL_FILE, &self.local ),
        };

        let json = serde_json::to_string_pretty( entries )?;
        fs::write( self.data_dir.join( file ), json )?;
        Ok(())
    }


    pub( crate ) fn find_mut(
        &mut self,
        kind: CatalogKind,
        path: &Path,
    ) -> Option<&mut PlaylistEntry> {
        self.catalog_mut( kind ).iter_mut().find( |e| e.path == path )
    }


    fn catalog( &self, kind: CatalogKind ) -> &Vec<PlaylistEntry> {
        match kind {
            CatalogKind::Online => &self.online,
            CatalogKind::Local => &self.local,
        }
    }


    fn catalog_mut( &mut self, kind: CatalogKind ) -> &mut Vec<PlaylistEntry> {
        match kind {
            CatalogKind::Online => &mut self.online,
            CatalogKind::Local => &mut self.local,
        }
    }


    fn is_referenced( &self, path: &Path ) -> bool {
        self.online.iter().chain( self.local.iter() ).any( |e| e.path == path )
    }


    /// Picks a title unused within the catalog whose derived cache
    /// path is also unreferenced. Distinct titles can collide after
    /// filename derivation, so the title check alone is not enough to
    /// keep playback paths unique.
    fn unique_title( &self, kind: CatalogKind, candidate: &str ) -> String {
        let entries = self.catalog( kind );

        let mut title = candidate.to_string();
        let mut n = 1;
        while entries.iter().any( |e| e.title == title || e.path == self.cache_path( &title ) ) {
            title = format!( "{} ({})", candidate, n );
            n += 1;
        }

        title
    }


    fn remove_backing_file( &self, kind: CatalogKind, entry: &PlaylistEntry ) {
        let owned = match kind {
            // Online playlist files are always generated by the store.
            CatalogKind::Online => true,
            CatalogKind::Local => self.is_internal( &entry.path ),
        };

        if owned && entry.path.exists() {
            if let Err( e ) = fs::remove_file( &entry.path ) {
                tracing::warn!( "Failed to remove playlist file {:?}: {}", entry.path, e );
            }
        }
    }
}


/// Reduces a title to a filename-safe slug: ASCII alphanumerics kept,
/// everything else replaced by `_`, runs of `_` collapsed.
fn title_slug( title: &str ) -> String {
    let mut slug = String::with_capacity( title.len() );
    let mut last_was_underscore = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push( c );
            last_was_underscore = false;
        } else if !last_was_underscore {
            slug.push( '_' );
            last_was_underscore = true;
        }
    }

    slug
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::scanner;


    fn store_in( dir: &Path ) -> PlaylistStore {
        PlaylistStore::new( dir.join( "data" ) ).unwrap()
    }


    #[test]
    fn test_cache_filename_derivation() {
        assert_eq!( PlaylistStore::cache_filename( "My List!" ), "local_My_List_.m3u8" );
        assert_eq!( PlaylistStore::cache_filename( "a  -  b" ), "local_a_b.m3u8" );
        assert_eq!( PlaylistStore::cache_filename( "plain" ), "local_plain.m3u8" );
    }


    #[test]
    fn test_cache_filename_is_stable() {
        assert_eq!(
            PlaylistStore::cache_filename( "Road Trip" ),
            PlaylistStore::cache_filename( "Road Trip" ),
        );
    }


    #[test]
    fn test_load_missing_documents_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in( dir.path() );
        store.load();

        assert!( store.entries( CatalogKind::Online ).is_empty() );
        assert!( store.entries( CatalogKind::Local ).is_empty() );
    }


    #[test]
    fn test_load_malformed_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in( dir.path() );
        fs::write( store.data_dir().join( "local-playlists.json" ), "{ not json" ).unwrap();

        store.load();
        assert!( store.entries( CatalogKind::Local ).is_empty() );
    }


    #[test]
    fn test_create_online_writes_playlist_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in( dir.path() );
        store.load();

        let urls = vec![
            "https://example.com/a.m3u8".to_string(),
            "https://example.com/b.m3u8".to_string(),
        ];
        let entry = store.create_online( "a", &urls ).unwrap();

        assert_eq!( entry.count, 2 );
        let text = fs::read_to_string( &entry.path ).unwrap();
        assert!( text.starts_with( "#EXTM3U" ) );
        assert_eq!( m3u::count( &text ), 2 );

        let mut reloaded = store_in( dir.path() );
        reloaded.load();
        assert_eq!( reloaded.entries( CatalogKind::Online ).len(), 1 );
        assert_eq!( reloaded.entries( CatalogKind::Online )[ 0 ].title, "a" );
    }


    #[test]
    fn test_create_local_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join( "media" );
        fs::create_dir( &media ).unwrap();
        for name in [ "one.mp4", "two.mkv", "three.mp3", "notes.txt", "cover.png" ] {
            fs::write( media.join( name ), b"" ).unwrap();
        }

        let mut store = store_in( dir.path() );
        store.load();

        let files = scanner::scan( &media );
        assert_eq!( files.len(), 3 );

        let entry = store.create_local( "media", &media, &files ).unwrap();
        assert_eq!( entry.count, 3 );
        assert_eq!( entry.scan_path.as_deref(), Some( media.as_path() ) );
        assert!( store.is_internal( &entry.path ) );

        // 1 header line plus an info/path pair per file
        let text = fs::read_to_string( &entry.path ).unwrap();
        assert_eq!( text.lines().count(), 1 + 3 * 2 );

        // companion copy lands next to the media
        assert!( media.join( "playlist.m3u8" ).exists() );
    }


    #[test]
    fn test_create_assigns_distinct_titles_and_paths() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join( "m" );
        fs::create_dir( &media ).unwrap();
        let files = vec![ media.join( "x.mp4" ) ];

        let mut store = store_in( dir.path() );
        store.load();

        let first = store.create_local( "Trip", &media, &files ).unwrap();
        let second = store.create_local( "Trip", &media, &files ).unwrap();

        assert_eq!( first.title, "Trip" );
        assert_eq!( second.title, "Trip (1)" );
        assert_ne!( first.path, second.path );
    }


    #[test]
    fn test_create_avoids_cache_path_collision() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join( "m" );
        fs::create_dir( &media ).unwrap();
        let files = vec![ media.join( "x.mp4" ) ];

        let mut store = store_in( dir.path() );
        store.load();

        // "Trip A" and "Trip-A" slug to the same filename
        let first = store.create_local( "Trip A", &media, &files ).unwrap();
        let second = store.create_local( "Trip-A", &media, &files ).unwrap();

        assert_ne!( first.path, second.path );
    }


    #[test]
    fn test_rename_persists_and_disambiguates() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join( "m" );
        fs::create_dir( &media ).unwrap();
        let files = vec![ media.join( "x.mp4" ) ];

        let mut store = store_in( dir.path() );
        store.load();
        let a = store.create_local( "A", &media, &files ).unwrap();
        let b = store.create_local( "B", &media, &files ).unwrap();

        // Renaming to an existing title picks up a counter
        let applied = store.rename( CatalogKind::Local, &b.path, "A" ).unwrap();
        assert_eq!( applied, "A (1)" );

        // Renaming to its own title is a no-op
        let applied = store.rename( CatalogKind::Local, &a.path, "A" ).unwrap();
        assert_eq!( applied, "A" );

        let mut reloaded = store_in( dir.path() );
        reloaded.load();
        let titles: Vec<&str> = reloaded.entries( CatalogKind::Local ).iter()
            .map( |e| e.title.as_str() )
            .collect();
        assert_eq!( titles, vec![ "A", "A (1)" ] );
    }


    #[test]
    fn test_delete_local_keeps_external_file() {
        let dir = tempfile::tempdir().unwrap();
        let external = dir.path().join( "user-playlist.m3u8" );
        fs::write( &external, "#EXTM3U" ).unwrap();

        let mut store = store_in( dir.path() );
        store.load();
        store.local.push( PlaylistEntry {
            title: "External".to_string(),
            path: external.clone(),
            scan_path: None,
            count: 0,
        });
        store.save( CatalogKind::Local ).unwrap();

        store.delete( CatalogKind::Local, &external ).unwrap();

        assert!( external.exists() );
        assert!( store.entries( CatalogKind::Local ).is_empty() );
    }


    #[test]
    fn test_delete_local_removes_internal_file() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join( "m" );
        fs::create_dir( &media ).unwrap();

        let mut store = store_in( dir.path() );
        store.load();
        let entry = store.create_local( "Trip", &media, &[ media.join( "x.mp4" ) ] ).unwrap();
        assert!( entry.path.exists() );

        store.delete( CatalogKind::Local, &entry.path ).unwrap();
        assert!( !entry.path.exists() );
    }


    #[test]
    fn test_delete_online_always_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in( dir.path() );
        store.load();

        let entry = store
            .create_online( "mix", &[ "https://example.com/a.mp4".to_string() ] )
            .unwrap();
        assert!( entry.path.exists() );

        store.delete( CatalogKind::Online, &entry.path ).unwrap();
        assert!( !entry.path.exists() );
    }


    #[test]
    fn test_delete_all_applies_ownership_rule() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join( "m" );
        fs::create_dir( &media ).unwrap();
        let external = dir.path().join( "keep.m3u8" );
        fs::write( &external, "#EXTM3U" ).unwrap();

        let mut store = store_in( dir.path() );
        store.load();
        let internal = store.create_local( "Trip", &media, &[ media.join( "x.mp4" ) ] ).unwrap();
        store.local.push( PlaylistEntry {
            title: "External".to_string(),
            path: external.clone(),
            scan_path: None,
            count: 0,
        });

        store.delete_all( CatalogKind::Local ).unwrap();

        assert!( store.entries( CatalogKind::Local ).is_empty() );
        assert!( !internal.path.exists() );
        assert!( external.exists() );
    }


    #[test]
    fn test_adopt_orphans_recovers_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in( dir.path() );
        store.load();

        let stray = store.data_dir().join( "local_Holiday.m3u8" );
        fs::write( &stray, "#EXTM3U\n#EXTINF:-1, a\n/m/a.mp4\n#EXTINF:-1, b\n/m/b.mp4" ).unwrap();

        let adopted = store.adopt_orphans().unwrap();
        assert_eq!( adopted, 1 );

        let entry = store.find( CatalogKind::Local, &stray ).unwrap();
        assert_eq!( entry.title, "Holiday" );
        assert_eq!( entry.count, 2 );
        assert_eq!( entry.scan_path, None );

        // Already-adopted files are not adopted twice
        assert_eq!( store.adopt_orphans().unwrap(), 0 );
    }
}
