//! Media discovery.
//!
//! Walks a folder tree and produces the ordered list of playable files
//! a playlist is generated from. A failure inside one subdirectory is
//! contained there; the rest of the scan always completes.

use std::fs;
use std::path::{ Path, PathBuf };

use crate::paths::natural_compare;


/// File extensions the player is expected to handle.
pub const PLAYABLE_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "webm", "wmv", "mp3", "flac", "m4a",
];

/// Bound on recursion so a symlink cycle cannot run away.
const MAX_DEPTH: usize = 64;


/// Scans a folder recursively for playable files.
///
/// Direct files of a directory come first in natural filename order,
/// followed by the fully-expanded contents of each subdirectory, also
/// in natural order, depth-first. A missing root yields an empty list.
pub fn scan( root: &Path ) -> Vec<PathBuf> {
    let mut collected = Vec::new();

    if !root.exists() {
        return collected;
    }

    scan_recursive( root, 0, &mut collected );
    collected
}


fn scan_recursive( dir: &Path, depth: usize, collected: &mut Vec<PathBuf> ) {
    if depth >= MAX_DEPTH {
        tracing::warn!( "Scan depth limit reached, skipping: {:?}", dir );
        return;
    }

    let entries = match fs::read_dir( dir ) {
        Ok( entries ) => entries,
        Err( e ) => {
            // Unreadable directory contributes nothing; siblings continue.
            tracing::warn!( "Cannot list {:?}: {}", dir, e );
            return;
        }
    };

    let mut dirs: Vec<( String, PathBuf )> = Vec::new();
    let mut files: Vec<( String, PathBuf )> = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if path.is_dir() {
            dirs.push(( name, path ));
        } else if is_playable( &path ) {
            files.push(( name, path ));
        }
    }

    dirs.sort_by( |a, b| natural_compare( &a.0, &b.0 ) );
    files.sort_by( |a, b| natural_compare( &a.0, &b.0 ) );

    collected.extend( files.into_iter().map( |( _, path )| path ) );

    for ( _, sub ) in dirs {
        scan_recursive( &sub, depth + 1, collected );
    }
}


/// Checks if a file has a playable extension (case-insensitive).
fn is_playable( path: &Path ) -> bool {
    path.extension()
        .and_then( |e| e.to_str() )
        .map( |e| PLAYABLE_EXTENSIONS.contains( &e.to_lowercase().as_str() ) )
        .unwrap_or( false )
}


#[cfg( test )]
mod tests {
    use super::*;


    fn touch( path: &Path ) {
        fs::write( path, b"" ).unwrap();
    }


    #[test]
    fn test_scan_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join( "never-created" );
        assert!( scan( &gone ).is_empty() );
    }


    #[test]
    fn test_scan_files_before_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch( &dir.path().join( "b.mp4" ) );
        touch( &dir.path().join( "a.mp4" ) );
        fs::create_dir( dir.path().join( "sub" ) ).unwrap();
        touch( &dir.path().join( "sub" ).join( "c.mp3" ) );

        let found = scan( dir.path() );
        let names: Vec<String> = found.iter()
            .map( |p| p.file_name().unwrap().to_string_lossy().into_owned() )
            .collect();

        assert_eq!( names, vec![ "a.mp4", "b.mp4", "c.mp3" ] );
    }


    #[test]
    fn test_scan_natural_order_within_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch( &dir.path().join( "ep10.mkv" ) );
        touch( &dir.path().join( "ep2.mkv" ) );
        touch( &dir.path().join( "ep1.mkv" ) );

        let names: Vec<String> = scan( dir.path() ).iter()
            .map( |p| p.file_name().unwrap().to_string_lossy().into_owned() )
            .collect();

        assert_eq!( names, vec![ "ep1.mkv", "ep2.mkv", "ep10.mkv" ] );
    }


    #[test]
    fn test_scan_subdirectories_in_natural_order() {
        let dir = tempfile::tempdir().unwrap();
        for sub in [ "season10", "season2" ] {
            fs::create_dir( dir.path().join( sub ) ).unwrap();
            touch( &dir.path().join( sub ).join( "pilot.mp4" ) );
        }

        let found = scan( dir.path() );
        assert_eq!( found.len(), 2 );
        assert!( found[ 0 ].starts_with( dir.path().join( "season2" ) ) );
        assert!( found[ 1 ].starts_with( dir.path().join( "season10" ) ) );
    }


    #[test]
    fn test_scan_filters_non_playable() {
        let dir = tempfile::tempdir().unwrap();
        touch( &dir.path().join( "movie.mp4" ) );
        touch( &dir.path().join( "notes.txt" ) );
        touch( &dir.path().join( "cover.jpg" ) );
        touch( &dir.path().join( "noextension" ) );

        let found = scan( dir.path() );
        assert_eq!( found.len(), 1 );
        assert_eq!( found[ 0 ].file_name().unwrap(), "movie.mp4" );
    }


    #[test]
    fn test_scan_extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch( &dir.path().join( "LOUD.MP4" ) );

        assert_eq!( scan( dir.path() ).len(), 1 );
    }


    #[cfg( unix )]
    #[test]
    fn test_scan_unreadable_subdirectory_keeps_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        touch( &dir.path().join( "keep.mp4" ) );

        let locked = dir.path().join( "locked" );
        fs::create_dir( &locked ).unwrap();
        fs::set_permissions( &locked, fs::Permissions::from_mode( 0o000 ) ).unwrap();

        let found = scan( dir.path() );

        fs::set_permissions( &locked, fs::Permissions::from_mode( 0o755 ) ).unwrap();

        assert!( found.iter().any( |p| p.ends_with( "keep.mp4" ) ) );
    }


    #[test]
    fn test_scan_symlink_cycle_terminates() {
        #[cfg( unix )]
        {
            let dir = tempfile::tempdir().unwrap();
            touch( &dir.path().join( "a.mp3" ) );
            std::os::unix::fs::symlink( dir.path(), dir.path().join( "loop" ) ).unwrap();

            let found = scan( dir.path() );
            assert!( found.iter().any( |p| p.ends_with( "a.mp3" ) ) );
        }
    }
}
