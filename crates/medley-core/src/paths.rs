//! Path and title helpers.
//!
//! Small helpers the standard library doesn't cover: natural ordering
//! for filenames and deriving display titles from paths and URLs.

use std::cmp::Ordering;
use std::path::Path;


/// Compares two filenames naturally and case-insensitively.
///
/// Embedded digit runs compare numerically, so "file2" sorts before
/// "file10".
pub fn natural_compare( a: &str, b: &str ) -> Ordering {
    natord::compare_ignore_case( a, b )
}


/// Returns the last path segment with its extension, for display.
pub fn display_name( path: &Path ) -> String {
    path.file_name()
        .map( |n| n.to_string_lossy().into_owned() )
        .unwrap_or_else( || path.to_string_lossy().into_owned() )
}


/// Derives a human-readable title from a URL.
///
/// Strips the query string, takes the last non-empty `/` segment
/// (falling back to "playlist"), and drops a trailing extension.
pub fn url_title( url: &str ) -> String {
    let clean = url.split( '?' ).next().unwrap_or( url );
    let last = clean.trim_end_matches( '/' )
        .rsplit( '/' )
        .next()
        .unwrap_or( "" );

    let last = if last.is_empty() { "playlist" } else { last };

    match last.rfind( '.' ) {
        Some( dot ) => last[ ..dot ].to_string(),
        None => last.to_string(),
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use std::path::PathBuf;


    #[test]
    fn test_natural_order_digit_runs() {
        let mut names = vec![ "f10", "f1", "f2" ];
        names.sort_by( |a, b| natural_compare( a, b ) );
        assert_eq!( names, vec![ "f1", "f2", "f10" ] );
    }


    #[test]
    fn test_natural_order_case_insensitive() {
        assert_eq!( natural_compare( "Episode 2", "episode 10" ), Ordering::Less );
        assert_eq!( natural_compare( "ABC", "abc" ), Ordering::Equal );
    }


    #[test]
    fn test_display_name_keeps_extension() {
        let path = PathBuf::from( "/media/shows/episode 1.mkv" );
        assert_eq!( display_name( &path ), "episode 1.mkv" );
    }


    #[test]
    fn test_url_title_strips_query_and_extension() {
        assert_eq!( url_title( "https://example.com/videos/intro.m3u8?token=abc" ), "intro" );
        assert_eq!( url_title( "http://example.com/a/b/show.mp4" ), "show" );
    }


    #[test]
    fn test_url_title_fallback_for_bare_host() {
        assert_eq!( url_title( "https://example.com/" ), "example" );
        assert_eq!( url_title( "" ), "playlist" );
    }
}
