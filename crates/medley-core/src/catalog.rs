//! Playlist catalog data model.
//!
//! An entry is one playlist's metadata record. The serialized field
//! names are the on-disk schema and stay stable across releases;
//! documents written before source-folder tracking existed have no
//! `scanPath` and must still load.

use std::path::PathBuf;

use serde::{ Deserialize, Serialize };


/// Which of the two catalogs an operation targets.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum CatalogKind {
    Online,
    Local,
}


/// One playlist's metadata record.
#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
pub struct PlaylistEntry {
    /// Unique human-readable title within the catalog.
    pub title: String,

    /// The path handed to the player. Starts out external for some
    /// legacy entries and is pinned to the internal cache on refresh.
    pub path: PathBuf,

    /// Source folder rescanned on refresh; absent on legacy entries.
    #[serde( rename = "scanPath", default, skip_serializing_if = "Option::is_none" )]
    pub scan_path: Option<PathBuf>,

    /// Item count of the last generated playlist. A cheap change
    /// signal for the UI, not ground truth.
    #[serde( default )]
    pub count: usize,
}


/// Returns a title unused by any of `taken`, disambiguating with
/// `" (n)"` suffixes counted from 1.
///
/// Each iteration checks the current candidate, so an existing run
/// "X (1)".."X (k)" yields "X (k+1)".
pub fn ensure_unique_title<'a>(
    taken: impl IntoIterator<Item = &'a str>,
    candidate: &str,
) -> String {
    let taken: Vec<&str> = taken.into_iter().collect();

    let mut result = candidate.to_string();
    let mut n = 1;
    while taken.iter().any( |t| *t == result ) {
        result = format!( "{} ({})", candidate, n );
        n += 1;
    }

    result
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_unique_title_unchanged_when_free() {
        let taken = [ "Movies", "Shows" ];
        assert_eq!( ensure_unique_title( taken, "Music" ), "Music" );
    }


    #[test]
    fn test_unique_title_appends_counter() {
        let taken = [ "Music" ];
        assert_eq!( ensure_unique_title( taken, "Music" ), "Music (1)" );
    }


    #[test]
    fn test_unique_title_skips_existing_run() {
        let taken = [ "Music", "Music (1)", "Music (2)", "Music (3)" ];
        assert_eq!( ensure_unique_title( taken, "Music" ), "Music (4)" );
    }


    #[test]
    fn test_unique_title_is_case_sensitive() {
        let taken = [ "music" ];
        assert_eq!( ensure_unique_title( taken, "Music" ), "Music" );
    }


    #[test]
    fn test_entry_serializes_with_stable_field_names() {
        let entry = PlaylistEntry {
            title: "Trip".to_string(),
            path: PathBuf::from( "/data/local_Trip.m3u8" ),
            scan_path: Some( PathBuf::from( "/media/trip" ) ),
            count: 12,
        };

        let json = serde_json::to_string( &entry ).unwrap();
        assert!( json.contains( "\"title\"" ) );
        assert!( json.contains( "\"path\"" ) );
        assert!( json.contains( "\"scanPath\"" ) );
        assert!( json.contains( "\"count\"" ) );
    }


    #[test]
    fn test_entry_loads_legacy_document_without_scan_path() {
        let json = r#"{ "title": "Old", "path": "/media/old/playlist.m3u8", "count": 3 }"#;
        let entry: PlaylistEntry = serde_json::from_str( json ).unwrap();

        assert_eq!( entry.title, "Old" );
        assert_eq!( entry.scan_path, None );
        assert_eq!( entry.count, 3 );
    }


    #[test]
    fn test_scan_path_omitted_when_absent() {
        let entry = PlaylistEntry {
            title: "Old".to_string(),
            path: PathBuf::from( "/media/old/playlist.m3u8" ),
            scan_path: None,
            count: 0,
        };

        let json = serde_json::to_string( &entry ).unwrap();
        assert!( !json.contains( "scanPath" ) );
    }
}
