//! Command-line argument parsing for Medley.

use std::path::PathBuf;

use clap::Parser;


/// Medley - A terminal playlist shelf for an external media player.
#[derive( Parser, Debug )]
#[command( name = "medley" )]
#[command( version, about, long_about = None )]
pub struct Args {
    /// Data directory override (catalogs, generated playlists, log).
    #[arg( short, long )]
    pub data_dir: Option<PathBuf>,

    /// Player command override, e.g. "vlc --fullscreen".
    #[arg( short, long )]
    pub player: Option<String>,
}
