//! Application state management for Teamdeck
//!
//! This module contains the main application state, handling keyboard input,
//! member loading, and state transitions between the list and detail views.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::style::Color;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::CacheStore;
use crate::cli::StartupConfig;
use crate::data::{DirectoryClient, Member};
use crate::loader::{LoadError, Loader, QueryKey};

/// Namespace for the application's on-disk cache
const CACHE_NAMESPACE: &str = "teamdeck";

/// Colors the card styles cycle through
const CARD_PALETTE: [Color; 6] = [
    Color::White,
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
];

/// Returns the palette color after `current`, wrapping at the end
fn next_palette_color(current: Color) -> Color {
    let index = CARD_PALETTE.iter().position(|c| *c == current).unwrap_or(0);
    CARD_PALETTE[(index + 1) % CARD_PALETTE.len()]
}

/// Messages sent from loader hooks to the main loop
#[derive(Debug, Clone)]
pub enum LoadEvent {
    /// The member list settled successfully
    Loaded(Vec<Member>),
    /// The load settled with a fetch error
    Failed(String),
}

/// Color choices applied to member cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardStyles {
    /// Color for member names
    pub name: Color,
    /// Color for address lines
    pub address: Color,
}

impl Default for CardStyles {
    fn default() -> Self {
        Self {
            name: Color::White,
            address: Color::Cyan,
        }
    }
}

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while the first fetch is in flight
    Loading,
    /// List view showing all members
    MemberList,
    /// Detail view for a specific member
    MemberDetail(u64),
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Index of currently selected member in list view
    pub selected_index: usize,
    /// Members currently shown, as delivered by the latest settled load
    pub members: Vec<Member>,
    /// Message from the latest failed load, if any
    pub load_error: Option<String>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Color choices for rendering member cards
    pub styles: CardStyles,
    /// Timestamp of the last successful load
    pub last_refresh: Option<DateTime<Local>>,
    /// Loader for the member list
    loader: Arc<Loader<Vec<Member>>>,
    /// Receives load outcomes from the loader hooks
    events: mpsc::UnboundedReceiver<LoadEvent>,
}

impl App {
    /// Creates a new App instance from the startup configuration.
    ///
    /// Wires the member loader to the on-disk cache (unless disabled) and to
    /// an event channel drained by the main loop.
    pub fn new(config: StartupConfig) -> Self {
        let store = if config.no_cache {
            None
        } else {
            CacheStore::open(CACHE_NAMESPACE)
        };

        let query = QueryKey::new("team-members").with_part(config.base_url.clone());

        if config.clear_cache {
            if let Some(ref store) = store {
                let _ = store.remove(&query.cache_key());
            }
        }

        let client = DirectoryClient::with_base_url(config.base_url);
        let (tx, events) = mpsc::unbounded_channel();

        let loader = {
            let success_tx = tx.clone();
            let error_tx = tx;
            Arc::new(
                Loader::new(query, move || {
                    let client = client.clone();
                    async move { client.fetch_members().await }
                })
                .with_store(store)
                .with_max_age_ms(config.max_age_ms)
                .on_success(move |members: &Vec<Member>| {
                    let _ = success_tx.send(LoadEvent::Loaded(members.clone()));
                })
                .on_error(move |err: &LoadError| {
                    let _ = error_tx.send(LoadEvent::Failed(err.to_string()));
                }),
            )
        };

        Self {
            state: AppState::Loading,
            selected_index: 0,
            members: Vec::new(),
            load_error: None,
            should_quit: false,
            styles: CardStyles::default(),
            last_refresh: None,
            loader,
            events,
        }
    }

    /// Kicks off a load cycle without blocking the UI loop
    pub fn start_load(&self) {
        let loader = Arc::clone(&self.loader);
        tokio::spawn(async move { loader.trigger().await });
    }

    /// True while a load cycle is in flight
    pub fn is_fetching(&self) -> bool {
        self.loader.is_fetching()
    }

    /// Applies any load outcomes delivered since the last frame
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
        }
    }

    /// Applies a single load outcome to the view state
    pub fn apply_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Loaded(members) => {
                self.members = members;
                self.load_error = None;
                self.last_refresh = Some(Local::now());

                if self.selected_index >= self.members.len() {
                    self.selected_index = 0;
                }

                match self.state.clone() {
                    AppState::Loading => self.state = AppState::MemberList,
                    // A refreshed list may no longer contain the open member
                    AppState::MemberDetail(id) if self.member_by_id(id).is_none() => {
                        self.state = AppState::MemberList;
                    }
                    _ => {}
                }
            }
            LoadEvent::Failed(message) => {
                self.load_error = Some(message);
                if self.state == AppState::Loading {
                    self.state = AppState::MemberList;
                }
            }
        }
    }

    /// Returns the number of members currently shown
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Returns the currently selected member, if any
    pub fn selected_member(&self) -> Option<&Member> {
        self.members.get(self.selected_index)
    }

    /// Looks up a member by directory id
    pub fn member_by_id(&self, id: u64) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Handles a keyboard event for the current view
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                self.start_load();
            }
            KeyCode::Char('n') => {
                self.styles.name = next_palette_color(self.styles.name);
            }
            KeyCode::Char('a') => {
                self.styles.address = next_palette_color(self.styles.address);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.state == AppState::MemberList && self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.state == AppState::MemberList
                    && self.selected_index + 1 < self.member_count()
                {
                    self.selected_index += 1;
                }
            }
            KeyCode::Enter => {
                if self.state == AppState::MemberList {
                    if let Some(id) = self.selected_member().map(|m| m.id) {
                        self.state = AppState::MemberDetail(id);
                    }
                }
            }
            KeyCode::Esc => {
                if matches!(self.state, AppState::MemberDetail(_)) {
                    self.state = AppState::MemberList;
                }
            }
            _ => {}
        }
    }
}
