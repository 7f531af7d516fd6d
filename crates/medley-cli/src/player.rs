//! Launching the external player.
//!
//! Playback itself is the player's job; Medley only hands it a path
//! and keeps running.

use std::path::Path;
use std::process::{ Command, Stdio };

use anyhow::{ anyhow, Context, Result };


/// Opens a playlist or media path with the configured player.
///
/// The player is spawned detached; its output would fight the TUI for
/// the terminal, so it is discarded.
pub fn open( player_command: &str, path: &Path ) -> Result<()> {
    let mut parts = player_command.split_whitespace();
    let bin = parts.next().ok_or_else( || anyhow!( "player command is empty" ) )?;

    Command::new( bin )
        .args( parts )
        .arg( path )
        .stdin( Stdio::null() )
        .stdout( Stdio::null() )
        .stderr( Stdio::null() )
        .spawn()
        .with_context( || format!( "failed to launch player '{}'", player_command ) )?;

    tracing::info!( "Opened {:?} with {}", path, bin );
    Ok(())
}


#[cfg( test )]
mod tests {
    use super::*;
    use std::path::PathBuf;


    #[test]
    fn test_open_empty_command_is_an_error() {
        assert!( open( "", &PathBuf::from( "/tmp/x.m3u8" ) ).is_err() );
    }


    #[test]
    fn test_open_missing_player_is_an_error() {
        let result = open( "definitely-not-a-player", &PathBuf::from( "/tmp/x.m3u8" ) );
        assert!( result.is_err() );
    }


    #[cfg( unix )]
    #[test]
    fn test_open_passes_path_as_argument() {
        // `true` exits immediately and ignores its argument
        assert!( open( "true", &PathBuf::from( "/tmp/x.m3u8" ) ).is_ok() );
    }
}
