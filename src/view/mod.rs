//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (truncation, scrollable lists, popups)
//! - `layout`: Navigation bar, session box and playlist sidebar
//! - `content`: Page bodies and forms
//! - `progress`: Player bar
//! - `overlays`: Notices, confirmation prompt and help

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, FormKind, FormState, PlayerState, Session, Track, UiState};

/// Everything a frame needs, snapshotted from the model before drawing
pub struct ViewData<'a> {
    pub player: &'a PlayerState,
    pub ui_state: &'a UiState,
    pub content: &'a ContentState,
    pub session: Option<&'a Session>,
    pub form: Option<&'a FormState>,
    pub playlist: &'a [Track],
}

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, data: &ViewData) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Navigation + session
                Constraint::Min(0),    // Page + playlist
                Constraint::Length(3), // Player bar
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], data.ui_state.page, data.session);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(70), // Page
                Constraint::Percentage(30), // Playlist
            ])
            .split(chunks[1]);

        content::render_page(frame, main_chunks[0], data);
        layout::render_playlist(frame, main_chunks[1], data.playlist, data.player);

        progress::render_player_bar(frame, chunks[2], data.player);

        // Event and song editors float over the page
        if let Some(form) = data.form {
            if matches!(form.kind, FormKind::Event { .. } | FormKind::Song { .. }) {
                content::render_form_popup(frame, form);
            }
        }

        if let Some(notice) = &data.ui_state.notice {
            overlays::render_notice(frame, notice);
        }

        if let Some(confirm) = &data.ui_state.confirm {
            overlays::render_confirm(frame, confirm);
        }

        if data.ui_state.show_help {
            overlays::render_help_popup(frame);
        }
    }
}
