//! M3U8 generation and counting.
//!
//! Playlists are plain extended M3U: a `#EXTM3U` header, then one
//! `#EXTINF` line and one location line per item.

use std::path::PathBuf;

use crate::paths::display_name;


/// Renders an M3U8 document for a list of file paths.
///
/// Each entry is labelled with its filename (extension included).
pub fn encode( paths: &[PathBuf] ) -> String {
    let items: Vec<( String, String )> = paths.iter()
        .map( |p| ( display_name( p ), p.to_string_lossy().into_owned() ) )
        .collect();
    encode_annotated( &items )
}


/// Renders an M3U8 document with caller-supplied labels.
///
/// @param items - (label, location) pairs, written in order
pub fn encode_annotated( items: &[( String, String )] ) -> String {
    let mut lines = Vec::with_capacity( 1 + items.len() * 2 );
    lines.push( "#EXTM3U".to_string() );

    for ( label, location ) in items {
        lines.push( format!( "#EXTINF:-1, {}", label ) );
        lines.push( location.clone() );
    }

    lines.join( "\n" )
}


/// Counts playable entries in M3U text.
///
/// Blank lines and `#` comment/directive lines are ignored. Only used
/// to recover a count for playlist files the catalog does not know
/// about yet.
pub fn count( text: &str ) -> usize {
    text.lines()
        .map( str::trim )
        .filter( |line| !line.is_empty() && !line.starts_with( '#' ) )
        .count()
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_encode_shape() {
        let paths = vec![
            PathBuf::from( "/media/a.mp4" ),
            PathBuf::from( "/media/sub/b.mp3" ),
        ];

        let text = encode( &paths );
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!( lines[ 0 ], "#EXTM3U" );
        assert_eq!( lines[ 1 ], "#EXTINF:-1, a.mp4" );
        assert_eq!( lines[ 2 ], "/media/a.mp4" );
        assert_eq!( lines[ 3 ], "#EXTINF:-1, b.mp3" );
        assert_eq!( lines[ 4 ], "/media/sub/b.mp3" );
        assert_eq!( lines.len(), 5 );
    }


    #[test]
    fn test_encode_annotated_labels() {
        let items = vec![
            ( "intro".to_string(), "https://example.com/intro.m3u8".to_string() ),
        ];

        let text = encode_annotated( &items );
        assert!( text.contains( "#EXTINF:-1, intro" ) );
        assert!( text.ends_with( "https://example.com/intro.m3u8" ) );
    }


    #[test]
    fn test_count_round_trips_encode() {
        let paths: Vec<PathBuf> = ( 1..=7 )
            .map( |i| PathBuf::from( format!( "/m/track{}.mp3", i ) ) )
            .collect();

        assert_eq!( count( &encode( &paths ) ), paths.len() );
    }


    #[test]
    fn test_count_skips_comments_and_blanks() {
        let text = "#EXTM3U\n\n#EXTINF:-1, a\n/m/a.mp4\n   \n# trailing note";
        assert_eq!( count( text ), 1 );
    }


    #[test]
    fn test_count_empty_text() {
        assert_eq!( count( "" ), 0 );
    }
}
