//! Main application model with state management

use std::sync::Arc;
use tokio::sync::Mutex;

use super::content::{upcoming_events, CatalogEntry, ContentState, Event, EventId, ItemAction, Track, TrackId};
use super::form::FormState;
use super::playlist::PlaylistStore;
use super::session::Session;
use super::types::{Notice, NoticeKind, Page, PendingConfirm, UiState};

/// How many upcoming concerts the home page lists
pub const HOME_EVENT_LIMIT: usize = 6;

/// Main application model containing all state
pub struct AppModel {
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    playlist: Arc<Mutex<PlaylistStore>>,
    session: Arc<Mutex<Option<Session>>>,
    form: Arc<Mutex<Option<FormState>>>,
    /// Bumped on every navigation; results of older page loads are dropped
    load_generation: Arc<Mutex<u64>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            playlist: Arc::new(Mutex::new(PlaylistStore::new())),
            session: Arc::new(Mutex::new(None)),
            form: Arc::new(Mutex::new(None)),
            load_generation: Arc::new(Mutex::new(0)),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub async fn current_page(&self) -> Page {
        self.ui_state.lock().await.page
    }

    /// Switches page, dropping page-local state. Returns the new load generation.
    pub async fn navigate(&self, page: Page) -> u64 {
        {
            let mut state = self.ui_state.lock().await;
            state.page = page;
            state.selected = 0;
            state.confirm = None;
            state.loading = false;
            state.search_query.clear();
            state.search_active = false;
        }
        *self.form.lock().await = None;

        let mut generation = self.load_generation.lock().await;
        *generation += 1;
        tracing::debug!(page = ?page, generation = *generation, "Navigated");
        *generation
    }

    /// A new generation for the current page (reload without leaving it)
    pub async fn begin_reload(&self) -> u64 {
        let mut generation = self.load_generation.lock().await;
        *generation += 1;
        *generation
    }

    /// Whether a load started at `generation` for `page` may still be applied
    pub async fn is_current_load(&self, page: Page, generation: u64) -> bool {
        *self.load_generation.lock().await == generation && self.current_page().await == page
    }

    pub async fn set_loading(&self, loading: bool) {
        self.ui_state.lock().await.loading = loading;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        state.selected = state.selected.saturating_sub(1);
    }

    pub async fn move_selection_down(&self) {
        let len = self.visible_list_len().await;
        let mut state = self.ui_state.lock().await;
        if state.selected + 1 < len {
            state.selected += 1;
        }
    }

    async fn visible_list_len(&self) -> usize {
        let ui = self.ui_state.lock().await.clone();
        let content = self.content_state.lock().await;
        match ui.page {
            Page::Home => visible_upcoming(&content.events).len(),
            Page::Events | Page::Dashboard => content.events.len(),
            Page::MusicCatalog => content.songs.len(),
            Page::MusicAdmin => content.filtered_songs(&ui.search_query).count(),
            _ => 0,
        }
    }

    /// Keeps the cursor inside the list after it shrinks
    async fn clamp_selection(&self) {
        let len = self.visible_list_len().await;
        let mut state = self.ui_state.lock().await;
        state.selected = state.selected.min(len.saturating_sub(1));
    }

    // ========================================================================
    // Notices & overlays
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        tracing::debug!(message = %message, "Showing error notice");
        self.ui_state.lock().await.notice = Some(Notice::error(message));
    }

    pub async fn set_success(&self, message: String) {
        self.ui_state.lock().await.notice = Some(Notice::success(message));
    }

    pub async fn clear_notice(&self) {
        self.ui_state.lock().await.notice = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state
            .lock()
            .await
            .notice
            .as_ref()
            .is_some_and(|n| n.kind == NoticeKind::Error)
    }

    pub async fn auto_clear_old_notices(&self) {
        let mut state = self.ui_state.lock().await;
        if state.notice.as_ref().is_some_and(Notice::is_expired) {
            state.notice = None;
        }
    }

    pub async fn toggle_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help = !state.show_help;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help = false;
    }

    pub async fn set_confirm(&self, confirm: PendingConfirm) {
        self.ui_state.lock().await.confirm = Some(confirm);
    }

    pub async fn take_confirm(&self) -> Option<PendingConfirm> {
        self.ui_state.lock().await.confirm.take()
    }

    // ========================================================================
    // Search (music admin)
    // ========================================================================

    pub async fn set_search_active(&self, active: bool) {
        self.ui_state.lock().await.search_active = active;
    }

    pub async fn append_to_search(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
        state.selected = 0;
    }

    pub async fn backspace_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.pop();
        state.selected = 0;
    }

    pub async fn clear_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.clear();
        state.search_active = false;
        state.selected = 0;
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub async fn set_events(&self, events: Vec<Event>) {
        {
            let mut content = self.content_state.lock().await;
            content.events = events;
            content.events_loaded = true;
        }
        self.clamp_selection().await;
    }

    pub async fn prepend_event(&self, event: Event) {
        self.content_state.lock().await.events.insert(0, event);
    }

    /// Replaces the event with `id` in place; false when it is no longer listed
    pub async fn replace_event(&self, id: &EventId, event: Event) -> bool {
        let mut content = self.content_state.lock().await;
        match content.events.iter_mut().find(|e| e.id.as_ref() == Some(id)) {
            Some(slot) => {
                *slot = event;
                true
            }
            None => false,
        }
    }

    pub async fn remove_event(&self, id: &EventId) {
        self.content_state
            .lock()
            .await
            .events
            .retain(|e| e.id.as_ref() != Some(id));
        self.clamp_selection().await;
    }

    pub async fn get_events(&self) -> Vec<Event> {
        self.content_state.lock().await.events.clone()
    }

    pub async fn get_selected_event(&self) -> Option<Event> {
        let ui = self.ui_state.lock().await.clone();
        let content = self.content_state.lock().await;
        match ui.page {
            Page::Home => visible_upcoming(&content.events).into_iter().nth(ui.selected),
            Page::Events | Page::Dashboard => content.events.get(ui.selected).cloned(),
            _ => None,
        }
    }

    // ========================================================================
    // Songs
    // ========================================================================

    pub async fn set_songs(&self, tracks: Vec<Track>) {
        {
            let mut content = self.content_state.lock().await;
            content.songs = tracks.into_iter().map(CatalogEntry::new).collect();
            content.songs_loaded = true;
        }
        self.clamp_selection().await;
    }

    pub async fn set_song_action(&self, id: &TrackId, action: ItemAction) {
        let mut content = self.content_state.lock().await;
        if let Some(entry) = content.songs.iter_mut().find(|e| &e.track.id == id) {
            entry.action = action;
        }
    }

    pub async fn get_selected_song(&self) -> Option<CatalogEntry> {
        let ui = self.ui_state.lock().await.clone();
        let content = self.content_state.lock().await;
        match ui.page {
            Page::MusicCatalog => content.songs.get(ui.selected).cloned(),
            Page::MusicAdmin => content.filtered_songs(&ui.search_query).nth(ui.selected).cloned(),
            _ => None,
        }
    }

    // ========================================================================
    // Playlist
    // ========================================================================

    /// Adds `track`; returns the new playlist when it changed
    pub async fn add_to_playlist(&self, track: Track) -> Option<Vec<Track>> {
        let mut playlist = self.playlist.lock().await;
        playlist.add(track).then(|| playlist.tracks().to_vec())
    }

    /// Removes `id`; returns the new playlist when it changed
    pub async fn remove_from_playlist(&self, id: &TrackId) -> Option<Vec<Track>> {
        let mut playlist = self.playlist.lock().await;
        playlist.remove(id).then(|| playlist.tracks().to_vec())
    }

    pub async fn playlist_contains(&self, id: &TrackId) -> bool {
        self.playlist.lock().await.contains(id)
    }

    pub async fn get_playlist(&self) -> Vec<Track> {
        self.playlist.lock().await.tracks().to_vec()
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub async fn get_session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    pub async fn set_session(&self, session: Option<Session>) {
        *self.session.lock().await = session;
    }

    // ========================================================================
    // Forms
    // ========================================================================

    pub async fn get_form(&self) -> Option<FormState> {
        self.form.lock().await.clone()
    }

    pub async fn set_form(&self, form: Option<FormState>) {
        *self.form.lock().await = form;
    }

    /// Applies `f` to the open form, if any
    pub async fn update_form<F>(&self, f: F)
    where
        F: FnOnce(&mut FormState),
    {
        if let Some(form) = self.form.lock().await.as_mut() {
            f(form);
        }
    }
}

/// Upcoming concerts as listed on the home page
pub fn visible_upcoming(events: &[Event]) -> Vec<Event> {
    let today = chrono::Local::now().date_naive();
    upcoming_events(events, today, HOME_EVENT_LIMIT)
}
