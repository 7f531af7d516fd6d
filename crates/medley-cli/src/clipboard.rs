//! Clipboard access through external helpers.
//!
//! Reads the system clipboard by spawning whichever paste helper the
//! platform provides. The child is given a deadline and killed past
//! it, so a wedged helper cannot hang the whole application.

use std::io::Read;
use std::process::{ Command, Stdio };
use std::thread;
use std::time::{ Duration, Instant };

use anyhow::{ anyhow, Result };


const READ_TIMEOUT: Duration = Duration::from_secs( 3 );

/// Paste helpers tried in order when none is configured.
const CANDIDATES: &[( &str, &[&str] )] = &[
    ( "wl-paste", &[ "--no-newline" ] ),
    ( "xclip", &[ "-selection", "clipboard", "-o" ] ),
    ( "xsel", &[ "--clipboard", "--output" ] ),
    ( "pbpaste", &[] ),
];


/// Reads the clipboard as text.
///
/// @param configured - Helper command override from settings, if any
pub fn read_text( configured: Option<&str> ) -> Result<String> {
    if let Some( command ) = configured {
        let mut parts = command.split_whitespace();
        let bin = parts.next()
            .ok_or_else( || anyhow!( "clipboard command is empty" ) )?;
        let args: Vec<&str> = parts.collect();

        return run_bounded( bin, &args, READ_TIMEOUT )
            .ok_or_else( || anyhow!( "clipboard command '{}' failed", command ) );
    }

    for ( bin, args ) in CANDIDATES {
        if let Some( text ) = run_bounded( bin, args, READ_TIMEOUT ) {
            return Ok( text );
        }
    }

    Err( anyhow!( "no clipboard helper found (wl-paste/xclip/xsel/pbpaste)" ) )
}


/// Extracts http(s) URLs from pasted text, one per line.
pub fn extract_urls( text: &str ) -> Vec<String> {
    text.lines()
        .map( str::trim )
        .filter( |line| !line.is_empty() )
        .filter( |line| {
            let lower = line.to_ascii_lowercase();
            lower.starts_with( "http://" ) || lower.starts_with( "https://" )
        })
        .map( String::from )
        .collect()
}


/// Runs a helper and captures stdout, killing it past the deadline.
///
/// @returns The trimmed output, or None on spawn failure, non-zero
///          exit, or timeout
fn run_bounded( bin: &str, args: &[&str], timeout: Duration ) -> Option<String> {
    let mut child = Command::new( bin )
        .args( args )
        .stdin( Stdio::null() )
        .stdout( Stdio::piped() )
        .stderr( Stdio::null() )
        .spawn()
        .ok()?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok( Some( status ) ) => {
                if !status.success() {
                    return None;
                }

                let mut output = String::new();
                child.stdout.take()?.read_to_string( &mut output ).ok()?;
                return Some( output.trim().to_string() );
            }
            Ok( None ) => {
                if Instant::now() >= deadline {
                    tracing::warn!( "Clipboard helper '{}' timed out", bin );
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                thread::sleep( Duration::from_millis( 25 ) );
            }
            Err( _ ) => return None,
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_extract_urls_filters_noise() {
        let text = "\
https://example.com/a.m3u8
some note
  HTTP://example.com/b.mp4

ftp://example.com/c.mp4";

        let urls = extract_urls( text );
        assert_eq!( urls, vec![
            "https://example.com/a.m3u8",
            "HTTP://example.com/b.mp4",
        ]);
    }


    #[test]
    fn test_extract_urls_empty_text() {
        assert!( extract_urls( "" ).is_empty() );
        assert!( extract_urls( "just words\n\n" ).is_empty() );
    }


    #[cfg( unix )]
    #[test]
    fn test_run_bounded_captures_output() {
        let out = run_bounded( "echo", &[ "hello" ], Duration::from_secs( 5 ) );
        assert_eq!( out.as_deref(), Some( "hello" ) );
    }


    #[cfg( unix )]
    #[test]
    fn test_run_bounded_kills_on_timeout() {
        let out = run_bounded( "sleep", &[ "5" ], Duration::from_millis( 100 ) );
        assert_eq!( out, None );
    }


    #[test]
    fn test_run_bounded_missing_binary() {
        let out = run_bounded( "definitely-not-a-binary", &[], Duration::from_secs( 1 ) );
        assert_eq!( out, None );
    }
}
