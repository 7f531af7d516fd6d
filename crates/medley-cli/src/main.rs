//! Medley CLI - Terminal playlist shelf
//!
//! Renders the playlist menu, collects prompt/confirm input, and hands
//! playback paths to the external player. All catalog logic lives in
//! medley-core; this binary is the host glue around it.

mod cli;
mod clipboard;
mod input;
mod menu;
mod player;
mod settings;

use std::fs;
use std::io;
use std::path::{ Path, PathBuf };
use std::time::{ Duration, Instant };

use anyhow::{ Context, Result };
use clap::Parser;
use crossterm::{
    event::{ self, Event, KeyCode, KeyEventKind, KeyModifiers },
    terminal::{ disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen },
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{ Block, Borders, List, ListItem, ListState, Paragraph },
};
use tracing_subscriber::EnvFilter;

use cli::Args;
use input::{ InputBuffer, InputMode };
use menu::{ build_menu, Action, MenuItem };
use settings::Settings;

use medley_core::{
    paths::url_title,
    refresh::{ refresh_entry, RefreshOutcome },
    scanner,
    CatalogKind, PlaylistStore,
};


/// Operation waiting on a text prompt.
enum PendingPrompt {
    Rename { kind: CatalogKind, path: PathBuf },
    FolderPath,
}


/// Operation waiting on a yes/no confirmation.
enum PendingConfirm {
    Delete { kind: CatalogKind, path: PathBuf },
    DeleteAll { kind: CatalogKind },
}


/// Application state.
struct App {
    store: PlaylistStore,
    settings: Settings,
    should_quit: bool,

    // Menu state
    menu: Vec<MenuItem>,
    menu_path: Vec<usize>,
    list_state: ListState,

    // Input state
    input_mode: InputMode,
    input_buffer: InputBuffer,
    prompt_label: String,
    pending_prompt: Option<PendingPrompt>,
    confirm_label: String,
    pending_confirm: Option<PendingConfirm>,

    // Status message (shown in status bar)
    status_message: Option<String>,
    status_clear_at: Option<Instant>,
}


impl App {
    /// Creates a new App instance.
    fn new( args: &Args, data_dir: PathBuf ) -> Result<Self> {
        let mut store = PlaylistStore::new( data_dir )?;
        store.load();

        match store.adopt_orphans() {
            Ok( 0 ) => {}
            Ok( n ) => tracing::info!( "Adopted {} stray playlist file(s)", n ),
            Err( e ) => tracing::warn!( "Orphan adoption failed: {}", e ),
        }

        let mut settings = Settings::load();
        // Materialize the file on first run so users can edit it
        settings.save();

        if let Some( player ) = &args.player {
            settings.player_command = player.clone();
        }

        let menu = build_menu(
            store.entries( CatalogKind::Online ),
            store.entries( CatalogKind::Local ),
        );

        let mut list_state = ListState::default();
        list_state.select( Some( 0 ) );

        Ok( Self {
            store,
            settings,
            should_quit: false,
            menu,
            menu_path: Vec::new(),
            list_state,
            input_mode: InputMode::Normal,
            input_buffer: InputBuffer::new(),
            prompt_label: String::new(),
            pending_prompt: None,
            confirm_label: String::new(),
            pending_confirm: None,
            status_message: None,
            status_clear_at: None,
        })
    }


    /// Sets a status message that auto-clears after a delay.
    fn set_status( &mut self, msg: impl Into<String> ) {
        self.status_message = Some( msg.into() );
        self.status_clear_at = Some( Instant::now() + Duration::from_secs( 3 ) );
    }


    /// Updates app state (clears expired messages).
    fn tick( &mut self ) {
        if let Some( clear_at ) = self.status_clear_at {
            if Instant::now() >= clear_at {
                self.status_message = None;
                self.status_clear_at = None;
            }
        }
    }


    /// Re-derives the menu tree from catalog state.
    fn rebuild_menu( &mut self ) {
        self.menu = build_menu(
            self.store.entries( CatalogKind::Online ),
            self.store.entries( CatalogKind::Local ),
        );

        // Drop any part of the open path the new tree no longer has
        let mut items: &[MenuItem] = &self.menu;
        let mut valid = 0;
        for &idx in &self.menu_path {
            match items.get( idx ) {
                Some( item ) if !item.children.is_empty() => {
                    items = &item.children;
                    valid += 1;
                }
                _ => break,
            }
        }
        self.menu_path.truncate( valid );

        let len = self.current_items().len();
        let selected = self.list_state.selected().unwrap_or( 0 );
        if selected >= len {
            self.list_state.select( Some( len.saturating_sub( 1 ) ) );
        }
    }


    /// Gets the items of the currently open (sub)menu.
    fn current_items( &self ) -> &[MenuItem] {
        let mut items: &[MenuItem] = &self.menu;
        for &idx in &self.menu_path {
            items = &items[ idx ].children;
        }
        items
    }


    /// Labels of the open submenu chain, for the header.
    fn breadcrumb( &self ) -> String {
        let mut labels = Vec::new();
        let mut items: &[MenuItem] = &self.menu;
        for &idx in &self.menu_path {
            if let Some( item ) = items.get( idx ) {
                labels.push( item.label.clone() );
                items = &item.children;
            }
        }
        labels.join( " / " )
    }


    fn handle_key( &mut self, code: KeyCode, modifiers: KeyModifiers ) {
        if code == KeyCode::Char( 'c' ) && modifiers.contains( KeyModifiers::CONTROL ) {
            self.should_quit = true;
            return;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key( code ),
            InputMode::Prompt => self.handle_prompt_key( code ),
            InputMode::Confirm => self.handle_confirm_key( code ),
        }
    }


    fn handle_normal_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Char( 'q' ) => self.should_quit = true,
            KeyCode::Up | KeyCode::Char( 'k' ) => self.select_previous(),
            KeyCode::Down | KeyCode::Char( 'j' ) => self.select_next(),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char( 'l' ) => self.activate_selected(),
            KeyCode::Esc | KeyCode::Left | KeyCode::Char( 'h' ) => self.leave_submenu(),
            KeyCode::Char( c ) => {
                // Top-level shortcut hints work from anywhere
                let action = self.menu.iter()
                    .find( |item| item.key == Some( c ) )
                    .and_then( |item| item.action.clone() );
                if let Some( action ) = action {
                    self.dispatch( action );
                }
            }
            _ => {}
        }
    }


    fn handle_prompt_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Enter => self.submit_prompt(),
            KeyCode::Esc => self.cancel_modal(),
            KeyCode::Backspace => self.input_buffer.backspace(),
            KeyCode::Left => self.input_buffer.move_left(),
            KeyCode::Right => self.input_buffer.move_right(),
            KeyCode::Home => self.input_buffer.move_home(),
            KeyCode::End => self.input_buffer.move_end(),
            KeyCode::Char( c ) => self.input_buffer.insert( c ),
            _ => {}
        }
    }


    fn handle_confirm_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Char( 'y' ) | KeyCode::Char( 'Y' ) | KeyCode::Enter => {
                self.finish_confirm( true );
            }
            KeyCode::Char( 'n' ) | KeyCode::Char( 'N' ) | KeyCode::Esc => {
                self.finish_confirm( false );
            }
            _ => {}
        }
    }


    fn select_next( &mut self ) {
        let len = self.current_items().len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or( 0 );
        self.list_state.select( Some( ( current + 1 ) % len ) );
    }


    fn select_previous( &mut self ) {
        let len = self.current_items().len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or( 0 );
        self.list_state.select( Some( if current == 0 { len - 1 } else { current - 1 } ) );
    }


    /// Descends into the selected submenu or runs the selected action.
    fn activate_selected( &mut self ) {
        let selected = match self.list_state.selected() {
            Some( s ) => s,
            None => return,
        };

        let ( has_children, action ) = match self.current_items().get( selected ) {
            Some( item ) => ( !item.children.is_empty(), item.action.clone() ),
            None => return,
        };

        if has_children {
            self.menu_path.push( selected );
            self.list_state.select( Some( 0 ) );
        } else if let Some( action ) = action {
            self.dispatch( action );
        }
    }


    fn leave_submenu( &mut self ) {
        if let Some( idx ) = self.menu_path.pop() {
            self.list_state.select( Some( idx ) );
        }
    }


    fn start_prompt( &mut self, label: &str, pending: PendingPrompt ) {
        self.prompt_label = label.to_string();
        self.pending_prompt = Some( pending );
        self.input_buffer.clear();
        self.input_mode = InputMode::Prompt;
    }


    fn start_confirm( &mut self, label: &str, pending: PendingConfirm ) {
        self.confirm_label = label.to_string();
        self.pending_confirm = Some( pending );
        self.input_mode = InputMode::Confirm;
    }


    fn cancel_modal( &mut self ) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.pending_prompt = None;
        self.pending_confirm = None;
    }


    /// Runs a menu action.
    fn dispatch( &mut self, action: Action ) {
        match action {
            Action::PasteUrls => self.paste_urls(),
            Action::CreateFromFolder => {
                self.start_prompt( "Folder to scan", PendingPrompt::FolderPath );
            }
            Action::Play { path } => self.open_in_player( &path ),
            Action::RefreshAndPlay { path } => self.refresh_and_play( &path ),
            Action::Rename { kind, path } => {
                self.start_prompt( "Enter new name", PendingPrompt::Rename { kind, path } );
            }
            Action::Delete { kind, path } => {
                let label = match kind {
                    CatalogKind::Online => "Are you sure you want to delete this playlist?",
                    CatalogKind::Local => "Remove this playlist from the list?",
                };
                self.start_confirm( label, PendingConfirm::Delete { kind, path } );
            }
            Action::DeleteAll { kind } => {
                let label = match kind {
                    CatalogKind::Online => "Delete all online playlists?",
                    CatalogKind::Local => "Clear all local playlist entries?",
                };
                self.start_confirm( label, PendingConfirm::DeleteAll { kind } );
            }
        }
    }


    /// Builds an online playlist from clipboard URLs and plays it.
    fn paste_urls( &mut self ) {
        let text = match clipboard::read_text( self.settings.clipboard_command.as_deref() ) {
            Ok( text ) => text,
            Err( e ) => {
                tracing::warn!( "Clipboard read failed: {}", e );
                self.set_status( "Could not read clipboard" );
                return;
            }
        };

        let urls = clipboard::extract_urls( &text );
        if urls.is_empty() {
            self.set_status( "No valid URLs found" );
            return;
        }

        let title = url_title( &urls[ 0 ] );
        match self.store.create_online( &title, &urls ) {
            Ok( entry ) => {
                self.open_in_player( &entry.path );
                self.set_status( format!( "{} items loaded", entry.count ) );
                self.rebuild_menu();
            }
            Err( e ) => {
                tracing::error!( "Failed to create online playlist: {}", e );
                self.set_status( "Could not save playlist" );
            }
        }
    }


    /// Scans a typed folder path into a new local playlist.
    fn create_from_folder( &mut self, folder: &Path ) {
        if !folder.exists() {
            self.set_status( "Folder not found" );
            return;
        }

        let files = scanner::scan( folder );
        if files.is_empty() {
            self.set_status( "No playable files found" );
            return;
        }

        let title = folder.file_name()
            .map( |n| n.to_string_lossy().into_owned() )
            .unwrap_or_else( || "Folder".to_string() );

        match self.store.create_local( &title, folder, &files ) {
            Ok( entry ) => {
                self.open_in_player( &entry.path );
                self.set_status( format!( "{} items added", entry.count ) );
                self.rebuild_menu();
            }
            Err( e ) => {
                tracing::error!( "Failed to create local playlist: {}", e );
                self.set_status( "Could not save playlist" );
            }
        }
    }


    /// Rescans a local playlist, then plays the regenerated file.
    fn refresh_and_play( &mut self, path: &Path ) {
        match refresh_entry( &mut self.store, path ) {
            Ok( RefreshOutcome::FolderMissing ) => self.set_status( "Original folder not found" ),
            Ok( RefreshOutcome::NoFilesFound ) => self.set_status( "No files found" ),
            Ok( RefreshOutcome::WriteFailed ) => self.set_status( "Cache write failed" ),
            Ok( RefreshOutcome::Refreshed { count, changed, path } ) => {
                self.open_in_player( &path );
                if changed {
                    self.set_status( format!( "Updated: {} items", count ) );
                    self.rebuild_menu();
                } else {
                    self.set_status( format!( "Loaded {} items", count ) );
                }
            }
            Err( e ) => {
                tracing::error!( "Refresh failed: {}", e );
                self.set_status( "Refresh failed" );
            }
        }
    }


    fn submit_prompt( &mut self ) {
        let pending = match self.pending_prompt.take() {
            Some( p ) => p,
            None => {
                self.cancel_modal();
                return;
            }
        };

        let answer = self.input_buffer.content().trim().to_string();
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();

        // An empty answer cancels, like dismissing the prompt
        if answer.is_empty() {
            return;
        }

        match pending {
            PendingPrompt::Rename { kind, path } => self.apply_rename( kind, &path, &answer ),
            PendingPrompt::FolderPath => self.create_from_folder( &expand_tilde( &answer ) ),
        }
    }


    fn apply_rename( &mut self, kind: CatalogKind, path: &Path, new_title: &str ) {
        match self.store.rename( kind, path, new_title ) {
            Ok( applied ) => {
                self.set_status( format!( "Renamed to '{}'", applied ) );
                self.rebuild_menu();
            }
            Err( e ) => {
                tracing::error!( "Rename failed: {}", e );
                self.set_status( "Rename failed" );
            }
        }
    }


    fn finish_confirm( &mut self, confirmed: bool ) {
        let pending = self.pending_confirm.take();
        self.input_mode = InputMode::Normal;

        if !confirmed {
            return;
        }

        let result = match pending {
            Some( PendingConfirm::Delete { kind, path } ) => self.store.delete( kind, &path ),
            Some( PendingConfirm::DeleteAll { kind } ) => self.store.delete_all( kind ),
            None => return,
        };

        match result {
            Ok(()) => {
                self.set_status( "Playlist removed" );
                self.rebuild_menu();
            }
            Err( e ) => {
                tracing::error!( "Delete failed: {}", e );
                self.set_status( "Delete failed" );
            }
        }
    }


    fn open_in_player( &mut self, path: &Path ) {
        if let Err( e ) = player::open( &self.settings.player_command, path ) {
            tracing::error!( "{:#}", e );
            self.set_status( format!( "Could not launch '{}'", self.settings.player_command ) );
        }
    }
}


fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = resolve_data_dir( &args )?;
    fs::create_dir_all( &data_dir )?;
    init_logging( &data_dir )?;

    let mut app = App::new( &args, data_dir )?;

    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute( EnterAlternateScreen )?;

    let mut terminal = Terminal::new( CrosstermBackend::new( io::stdout() ) )?;

    // Main loop
    loop {
        // Update state
        app.tick();

        // Draw UI
        terminal.draw( |frame| draw_ui( frame, &mut app ) )?;

        // Handle events with timeout
        if event::poll( Duration::from_millis( 100 ) )? {
            if let Event::Key( key ) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key( key.code, key.modifiers );
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Cleanup
    disable_raw_mode()?;
    io::stdout().execute( LeaveAlternateScreen )?;

    Ok(())
}


/// Picks the private data directory (catalogs, playlists, log).
fn resolve_data_dir( args: &Args ) -> Result<PathBuf> {
    if let Some( dir ) = &args.data_dir {
        return Ok( dir.clone() );
    }

    dirs::data_local_dir()
        .map( |d| d.join( "medley" ) )
        .context( "could not determine a data directory; pass --data-dir" )
}


/// Routes log output to a file; the terminal belongs to the TUI.
fn init_logging( data_dir: &Path ) -> Result<()> {
    let log_file = fs::OpenOptions::new()
        .create( true )
        .append( true )
        .open( data_dir.join( "medley.log" ) )?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new( "info" ) )
        )
        .with_ansi( false )
        .with_writer( std::sync::Arc::new( log_file ) )
        .init();

    Ok(())
}


/// Expands a leading `~` so typed paths behave like shell paths.
fn expand_tilde( raw: &str ) -> PathBuf {
    if raw == "~" {
        if let Some( home ) = dirs::home_dir() {
            return home;
        }
    }

    if let Some( rest ) = raw.strip_prefix( "~/" ) {
        if let Some( home ) = dirs::home_dir() {
            return home.join( rest );
        }
    }

    PathBuf::from( raw )
}


/// Draws the main UI.
fn draw_ui( frame: &mut Frame, app: &mut App ) {
    let chunks = Layout::default()
        .direction( Direction::Vertical )
        .constraints([
            Constraint::Length( 2 ),  // Header
            Constraint::Min( 0 ),     // Menu
            Constraint::Length( 1 ),  // Status bar
        ])
        .split( frame.area() );

    let location = if app.menu_path.is_empty() {
        "MEDLEY".to_string()
    } else {
        format!( "MEDLEY - {}", app.breadcrumb() )
    };

    let header = Paragraph::new( format!( "  {}", location ) )
        .style( Style::default().fg( Color::Cyan ).bold() )
        .block( Block::default().borders( Borders::BOTTOM ) );
    frame.render_widget( header, chunks[ 0 ] );

    draw_menu( frame, app, chunks[ 1 ] );
    draw_status_bar( frame, app, chunks[ 2 ] );
}


fn draw_menu( frame: &mut Frame, app: &mut App, area: Rect ) {
    let items: Vec<ListItem> = app.current_items().iter()
        .map( |item| {
            let marker = if item.children.is_empty() { "  " } else { "> " };
            let hint = item.key
                .map( |k| format!( "  [{}]", k ) )
                .unwrap_or_default();
            ListItem::new( format!( " {}{}{}", marker, item.label, hint ) )
        })
        .collect();

    let list = List::new( items )
        .block(
            Block::default()
                .title( " Playlists " )
                .borders( Borders::ALL )
                .border_style( Style::default().fg( Color::Cyan ) )
        )
        .highlight_style( Style::default().fg( Color::Yellow ).bold() );

    frame.render_stateful_widget( list, area, &mut app.list_state );
}


fn draw_status_bar( frame: &mut Frame, app: &App, area: Rect ) {
    let ( text, style ) = match app.input_mode {
        InputMode::Prompt => {
            ( format!( "{}: {}", app.prompt_label, app.input_buffer.content() ),
              Style::default().fg( Color::Yellow ) )
        }
        InputMode::Confirm => {
            ( format!( "{} [y/n]", app.confirm_label ), Style::default().fg( Color::Yellow ) )
        }
        InputMode::Normal => {
            if let Some( ref msg ) = app.status_message {
                ( msg.clone(), Style::default().fg( Color::Green ) )
            } else {
                ( " [Enter]Open [Esc]Back [v]Paste URLs [o]Open Folder [q]Quit ".to_string(),
                  Style::default().fg( Color::DarkGray ) )
            }
        }
    };

    let status = Paragraph::new( text ).style( style );
    frame.render_widget( status, area );

    // Show cursor while typing a prompt answer
    if app.input_mode == InputMode::Prompt {
        let cursor_x = area.x
            + app.prompt_label.chars().count() as u16
            + 2
            + app.input_buffer.cursor_char_pos() as u16;
        frame.set_cursor_position(( cursor_x, area.y ));
    }
}
