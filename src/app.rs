//! Application state management for cfpwatch
//!
//! This module contains the main application state, handling keyboard
//! input, cache refreshes, and state transitions between the list and
//! detail views.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};

use crate::cache::CfpCache;
use crate::cli::StartupConfig;
use crate::data::{CfpRecord, SessionizeClient};
use crate::query::{self, SortKey};

/// Minimum spacing between lazy refresh attempts, so a failing upstream
/// is not hammered on every event-loop tick
const FRESHNESS_CHECK_SPACING: Duration = Duration::from_secs(30);

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while the first fetch runs
    Loading,
    /// List view showing the filtered, sorted CFPs
    CfpList,
    /// Detail view for one CFP, identified by its event id
    CfpDetail(i32),
}

/// Where typed characters go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys are commands
    Normal,
    /// Keys edit the search term
    Search,
    /// Keys edit the goto-id input
    GotoId,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Current input mode
    pub input_mode: InputMode,
    /// Live search term applied to the record set
    pub search_input: String,
    /// Buffer for the goto-by-id prompt
    pub goto_input: String,
    /// Whether only currently open CFPs are shown
    pub open_only: bool,
    /// Active sort key
    pub sort_key: SortKey,
    /// Active sort direction
    pub ascending: bool,
    /// Index of the currently selected row in the list view
    pub selected_index: usize,
    /// The filtered, sorted view over the cached snapshot
    pub results: Vec<CfpRecord>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating the user asked for a forced refresh
    pub refresh_requested: bool,
    /// Flag to show the help overlay
    pub show_help: bool,
    /// Scroll offset for the detail view
    pub detail_scroll_offset: u16,
    /// Last fetch failure, shown in the status bar until the next
    /// successful refresh
    pub status_message: Option<String>,
    /// Timestamp of the last successful refresh, for the status bar
    pub last_refresh: Option<DateTime<Local>>,
    /// When a refresh was last attempted, successful or not
    last_fetch_attempt: Option<Instant>,
    /// Shared record cache
    cache: Arc<CfpCache>,
    /// Sessionize API client
    client: SessionizeClient,
}

impl App {
    /// Creates a new App instance with default state
    pub fn new(client: SessionizeClient) -> Self {
        Self {
            state: AppState::Loading,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            goto_input: String::new(),
            open_only: true,
            sort_key: SortKey::CfpEndDate,
            ascending: true,
            selected_index: 0,
            results: Vec::new(),
            should_quit: false,
            refresh_requested: false,
            show_help: false,
            detail_scroll_offset: 0,
            status_message: None,
            last_refresh: None,
            last_fetch_attempt: None,
            cache: Arc::new(CfpCache::new()),
            client,
        }
    }

    /// Creates a new App instance with the given startup configuration.
    ///
    /// This applies CLI arguments like --all, --sort, and --search to
    /// the initial view settings.
    pub fn with_startup_config(client: SessionizeClient, config: &StartupConfig) -> Self {
        let mut app = Self::new(client);
        app.open_only = config.open_only;
        app.sort_key = config.sort_key;
        app.ascending = config.ascending;
        app.search_input = config.search_term.clone();
        app
    }

    /// Performs the first fetch and moves to the list view.
    ///
    /// A failed fetch still lands in the list view (over an empty set)
    /// with the error in the status bar; the lazy freshness check will
    /// retry later.
    pub async fn load_initial_data(&mut self) {
        self.last_fetch_attempt = Some(Instant::now());
        match self.cache.ensure_fresh(&self.client).await {
            Ok(()) => self.note_refresh_success(),
            Err(err) => self.status_message = Some(err.to_string()),
        }
        self.requery();
        self.state = AppState::CfpList;
    }

    /// Performs a forced refresh in response to the `r` key.
    ///
    /// On failure the previous snapshot stays on screen and the error
    /// is surfaced in the status bar.
    pub async fn refresh_data(&mut self) {
        self.refresh_requested = false;
        self.last_fetch_attempt = Some(Instant::now());
        match self.cache.force_refresh(&self.client).await {
            Ok(()) => self.note_refresh_success(),
            Err(err) => self.status_message = Some(err.to_string()),
        }
        self.requery();
    }

    /// Lazy freshness check, called once per event-loop tick.
    ///
    /// Refreshes only when the cache has outlived its TTL, and spaces
    /// attempts out so a failing upstream is not retried on every tick.
    pub async fn keep_fresh(&mut self) {
        if self.state == AppState::Loading || !self.cache.is_stale() {
            return;
        }
        if self
            .last_fetch_attempt
            .is_some_and(|at| at.elapsed() < FRESHNESS_CHECK_SPACING)
        {
            return;
        }

        self.last_fetch_attempt = Some(Instant::now());
        match self.cache.ensure_fresh(&self.client).await {
            Ok(()) => self.note_refresh_success(),
            Err(err) => self.status_message = Some(err.to_string()),
        }
        self.requery();
    }

    fn note_refresh_success(&mut self) {
        self.status_message = None;
        self.last_refresh = self
            .cache
            .last_refresh()
            .map(|stamp| stamp.with_timezone(&Local));
    }

    /// Re-runs the query pipeline over the current cache snapshot and
    /// clamps the selection to the new result set.
    pub fn requery(&mut self) {
        let snapshot = self.cache.snapshot();
        self.results = query::search(
            &snapshot,
            &self.search_input,
            self.open_only,
            self.sort_key,
            self.ascending,
        );
        if self.selected_index >= self.results.len() {
            self.selected_index = self.results.len().saturating_sub(1);
        }
    }

    /// Returns the currently selected record, if any
    pub fn selected_record(&self) -> Option<&CfpRecord> {
        self.results.get(self.selected_index)
    }

    /// Returns the record shown in the detail view, if any
    pub fn detail_record(&self) -> Option<&CfpRecord> {
        match self.state {
            AppState::CfpDetail(event_id) => self
                .results
                .iter()
                .find(|record| record.event_id == event_id),
            _ => None,
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (Esc also quits from the list view)
    /// - `Up`/`k`, `Down`/`j`: Move selection / scroll detail
    /// - `Enter`: Open detail view for the selected CFP
    /// - `/`: Edit the search term (Enter/Esc to finish)
    /// - `#`: Jump to a CFP by event id
    /// - `o`: Toggle open-only filter
    /// - `s`: Cycle the sort key
    /// - `a`: Toggle sort direction
    /// - `r`: Force a refresh
    /// - `?`: Toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.input_mode {
            InputMode::Search => self.handle_search_key(key_event),
            InputMode::GotoId => self.handle_goto_key(key_event),
            InputMode::Normal => self.handle_normal_key(key_event),
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.requery();
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.requery();
            }
            _ => {}
        }
    }

    fn handle_goto_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc => {
                self.goto_input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let input = std::mem::take(&mut self.goto_input);
                self.input_mode = InputMode::Normal;
                self.open_detail_by_id(&input);
            }
            KeyCode::Backspace => {
                self.goto_input.pop();
            }
            KeyCode::Char(c) => {
                self.goto_input.push(c);
            }
            _ => {}
        }
    }

    /// Opens the detail view for the record with the given id, taken as
    /// raw user input. Non-numeric or unknown ids show a status message
    /// instead of failing.
    fn open_detail_by_id(&mut self, input: &str) {
        let found = query::get_by_id(&self.results, input).map(|record| record.event_id);
        let Some(event_id) = found else {
            self.status_message = Some(format!("No CFP with id '{}'", input.trim()));
            return;
        };

        if let Some(position) = self.results.iter().position(|r| r.event_id == event_id) {
            self.selected_index = position;
        }
        self.detail_scroll_offset = 0;
        self.state = AppState::CfpDetail(event_id);
    }

    fn handle_normal_key(&mut self, key_event: KeyEvent) {
        match self.state {
            AppState::Loading => {
                // Only quit is allowed during loading
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::CfpList => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Enter => {
                    if let Some(record) = self.selected_record() {
                        let event_id = record.event_id;
                        self.detail_scroll_offset = 0;
                        self.state = AppState::CfpDetail(event_id);
                    }
                }
                KeyCode::Char('/') => {
                    self.input_mode = InputMode::Search;
                }
                KeyCode::Char('#') => {
                    self.goto_input.clear();
                    self.input_mode = InputMode::GotoId;
                }
                KeyCode::Char('o') => {
                    self.open_only = !self.open_only;
                    self.requery();
                }
                KeyCode::Char('s') => {
                    self.sort_key = self.sort_key.next();
                    self.requery();
                }
                KeyCode::Char('a') => {
                    self.ascending = !self.ascending;
                    self.requery();
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::CfpDetail(_) => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.detail_scroll_offset = 0;
                    self.state = AppState::CfpList;
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.detail_scroll_offset = self.detail_scroll_offset.saturating_add(1);
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.detail_scroll_offset = self.detail_scroll_offset.saturating_sub(1);
                }
                KeyCode::Char('g') => {
                    self.detail_scroll_offset = 0;
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.results.len() {
            self.selected_index += 1;
        }
    }
}
