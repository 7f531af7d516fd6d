//! Declarative menu tree.
//!
//! The whole menu is a pure function of catalog state: after every
//! mutation the tree is derived again rather than edited in place.
//! Actions are stable identifiers resolved by the dispatch code, so a
//! rebuilt tree keeps pointing at the same catalog entries.

use std::path::PathBuf;

use medley_core::{ CatalogKind, PlaylistEntry };


/// What a menu item does when activated.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum Action {
    /// Read URLs from the clipboard into a new online playlist.
    PasteUrls,

    /// Prompt for a folder and build a local playlist from it.
    CreateFromFolder,

    /// Hand an online playlist to the player as-is.
    Play { path: PathBuf },

    /// Rescan, rewrite, then hand a local playlist to the player.
    RefreshAndPlay { path: PathBuf },

    Rename { kind: CatalogKind, path: PathBuf },
    Delete { kind: CatalogKind, path: PathBuf },
    DeleteAll { kind: CatalogKind },
}


/// One node of the menu tree.
#[derive( Debug, Clone )]
pub struct MenuItem {
    pub label: String,
    pub action: Option<Action>,
    pub children: Vec<MenuItem>,
    /// Shortcut hint handled in normal mode.
    pub key: Option<char>,
}


impl MenuItem {
    /// A leaf item that triggers an action.
    fn item( label: impl Into<String>, action: Action ) -> Self {
        Self {
            label: label.into(),
            action: Some( action ),
            children: Vec::new(),
            key: None,
        }
    }


    /// A node that opens a submenu.
    fn submenu( label: impl Into<String>, children: Vec<MenuItem> ) -> Self {
        Self {
            label: label.into(),
            action: None,
            children,
            key: None,
        }
    }


    fn with_key( mut self, key: char ) -> Self {
        self.key = Some( key );
        self
    }
}


/// Builds the full menu tree from the two catalogs.
pub fn build_menu( online: &[PlaylistEntry], local: &[PlaylistEntry] ) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::item( "Paste URLs as Playlist", Action::PasteUrls ).with_key( 'v' ),
        MenuItem::item( "Open Folder as Playlist", Action::CreateFromFolder ).with_key( 'o' ),
    ];

    if !online.is_empty() {
        let children = online.iter()
            .map( |entry| {
                MenuItem::submenu( entry.title.clone(), vec![
                    MenuItem::item( "Play", Action::Play { path: entry.path.clone() } ),
                    MenuItem::item( "Rename", Action::Rename {
                        kind: CatalogKind::Online,
                        path: entry.path.clone(),
                    }),
                    MenuItem::item( "Delete", Action::Delete {
                        kind: CatalogKind::Online,
                        path: entry.path.clone(),
                    }),
                ])
            })
            .collect();
        items.push( MenuItem::submenu( "Online Playlists", children ) );
    }

    if !local.is_empty() {
        let children = local.iter()
            .map( |entry| {
                MenuItem::submenu( format!( "{} ({})", entry.title, entry.count ), vec![
                    MenuItem::item( "Play (Auto-update)", Action::RefreshAndPlay {
                        path: entry.path.clone(),
                    }),
                    MenuItem::item( "Rename", Action::Rename {
                        kind: CatalogKind::Local,
                        path: entry.path.clone(),
                    }),
                    MenuItem::item( "Delete", Action::Delete {
                        kind: CatalogKind::Local,
                        path: entry.path.clone(),
                    }),
                ])
            })
            .collect();
        items.push( MenuItem::submenu( "Local Playlists", children ) );
    }

    if !online.is_empty() || !local.is_empty() {
        let mut manage = Vec::new();
        if !online.is_empty() {
            manage.push( MenuItem::item(
                "Remove All Online Playlists",
                Action::DeleteAll { kind: CatalogKind::Online },
            ));
        }
        if !local.is_empty() {
            manage.push( MenuItem::item(
                "Remove All Local Playlists",
                Action::DeleteAll { kind: CatalogKind::Local },
            ));
        }
        items.push( MenuItem::submenu( "Manage Playlists", manage ) );
    }

    items
}


#[cfg( test )]
mod tests {
    use super::*;


    fn entry( title: &str, path: &str, count: usize ) -> PlaylistEntry {
        PlaylistEntry {
            title: title.to_string(),
            path: PathBuf::from( path ),
            scan_path: None,
            count,
        }
    }


    #[test]
    fn test_empty_catalogs_build_only_create_actions() {
        let menu = build_menu( &[], &[] );

        assert_eq!( menu.len(), 2 );
        assert_eq!( menu[ 0 ].action, Some( Action::PasteUrls ) );
        assert_eq!( menu[ 1 ].action, Some( Action::CreateFromFolder ) );
    }


    #[test]
    fn test_local_labels_carry_counts() {
        let local = vec![ entry( "Trip", "/data/local_Trip.m3u8", 12 ) ];
        let menu = build_menu( &[], &local );

        let section = menu.iter().find( |m| m.label == "Local Playlists" ).unwrap();
        assert_eq!( section.children[ 0 ].label, "Trip (12)" );
    }


    #[test]
    fn test_entry_actions_carry_stable_paths() {
        let online = vec![ entry( "Mix", "/data/local_Mix.m3u8", 3 ) ];
        let menu = build_menu( &online, &[] );

        let section = menu.iter().find( |m| m.label == "Online Playlists" ).unwrap();
        let playlist = &section.children[ 0 ];

        assert_eq!(
            playlist.children[ 0 ].action,
            Some( Action::Play { path: PathBuf::from( "/data/local_Mix.m3u8" ) } ),
        );
        assert!( matches!(
            playlist.children[ 2 ].action,
            Some( Action::Delete { kind: CatalogKind::Online, .. } ),
        ));
    }


    #[test]
    fn test_manage_section_tracks_catalog_presence() {
        let online = vec![ entry( "Mix", "/data/a.m3u8", 1 ) ];

        let menu = build_menu( &online, &[] );
        let manage = menu.iter().find( |m| m.label == "Manage Playlists" ).unwrap();
        assert_eq!( manage.children.len(), 1 );

        let menu = build_menu( &[], &[] );
        assert!( menu.iter().all( |m| m.label != "Manage Playlists" ) );
    }
}
