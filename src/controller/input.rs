//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{FormKind, FormState, Page, PendingConfirm, UiState};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.model.lock().await.set_should_quit(true).await;
            return Ok(());
        }

        let (ui_state, form) = {
            let model = self.model.lock().await;
            (model.get_ui_state().await, model.get_form().await)
        };

        // Confirmation prompt blocks all other interactions
        if ui_state.confirm.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('s') | KeyCode::Char('S')
                | KeyCode::Enter => {
                    let pending = self.model.lock().await.take_confirm().await;
                    if let Some(pending) = pending {
                        self.spawn_confirmed(pending);
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.model.lock().await.take_confirm().await;
                }
                _ => {}
            }
            return Ok(());
        }

        // Handle help popup
        if ui_state.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('?')) {
                self.model.lock().await.hide_help_popup().await;
            }
            return Ok(());
        }

        // Typing into a form
        if let Some(form) = form.as_ref().filter(|f| f.editing) {
            self.handle_form_key(key, form).await;
            return Ok(());
        }

        if key.code == KeyCode::Esc && ui_state.notice.is_some() {
            self.model.lock().await.clear_notice().await;
            return Ok(());
        }

        // Search box on the music admin page
        if ui_state.search_active {
            let model = self.model.lock().await;
            match key.code {
                KeyCode::Esc => model.clear_search().await,
                KeyCode::Enter => model.set_search_active(false).await,
                KeyCode::Backspace => model.backspace_search().await,
                KeyCode::Char(c) => model.append_to_search(c).await,
                _ => {}
            }
            return Ok(());
        }

        if self.handle_page_key(key, &ui_state, form.as_ref()).await {
            return Ok(());
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.model.lock().await.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                let forward = !key.modifiers.contains(KeyModifiers::SHIFT);
                self.cycle_page(forward).await;
            }
            KeyCode::BackTab => {
                self.cycle_page(false).await;
            }
            KeyCode::Up => {
                self.model.lock().await.move_selection_up().await;
            }
            KeyCode::Down => {
                self.model.lock().await.move_selection_down().await;
            }
            KeyCode::F(5) => {
                self.reload_current_page().await;
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                self.toggle_playback().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.next_track().await;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.previous_track().await;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.toggle_shuffle().await;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.toggle_repeat().await;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.volume_up().await;
            }
            KeyCode::Char('-') => {
                self.volume_down().await;
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.toggle_mute().await;
            }
            KeyCode::Char(',') => {
                self.seek_backward().await;
            }
            KeyCode::Char('.') => {
                self.seek_forward().await;
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.seek_to_tenth(c.to_digit(10).unwrap_or(0)).await;
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                self.logout().await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                self.model.lock().await.toggle_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_form_key(&self, key: KeyEvent, form: &FormState) {
        let model = self.model.lock().await;
        match key.code {
            KeyCode::Esc => match form.kind {
                FormKind::Event { .. } | FormKind::Song { .. } => model.set_form(None).await,
                _ => model.update_form(|f| f.editing = false).await,
            },
            KeyCode::Tab | KeyCode::Down => model.update_form(FormState::focus_next).await,
            KeyCode::BackTab | KeyCode::Up => model.update_form(FormState::focus_prev).await,
            KeyCode::Backspace => model.update_form(FormState::backspace).await,
            KeyCode::Enter => {
                drop(model);
                let controller = self.clone();
                let kind = form.kind.clone();
                tokio::spawn(async move {
                    match kind {
                        FormKind::Event { .. } => controller.save_event_form().await,
                        FormKind::Song { .. } => controller.save_song_form().await,
                        _ => controller.submit_auth_form().await,
                    }
                });
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                model.update_form(|f| f.insert_char(c)).await;
            }
            _ => {}
        }
    }

    /// Keys that only mean something on the current page. Returns whether the key was used.
    async fn handle_page_key(&self, key: KeyEvent, ui_state: &UiState, form: Option<&FormState>) -> bool {
        match (ui_state.page, key.code) {
            (Page::Home, KeyCode::Enter) => {
                self.go_to(Page::Events).await;
                true
            }
            (Page::MusicCatalog, KeyCode::Enter) => {
                self.play_selected_song().await;
                true
            }
            (Page::MusicCatalog, KeyCode::Char('a') | KeyCode::Char('A')) => {
                self.toggle_selected_in_playlist().await;
                true
            }
            (Page::Login, KeyCode::Char('c') | KeyCode::Char('C')) => {
                self.go_to(Page::Register).await;
                true
            }
            (Page::Login | Page::Register | Page::ConfirmCode, KeyCode::Enter | KeyCode::Char('i'))
                if form.is_some() =>
            {
                self.model.lock().await.update_form(|f| f.editing = true).await;
                true
            }
            (Page::Dashboard, KeyCode::Char('c')) => {
                self.open_new_event_form().await;
                true
            }
            (Page::Dashboard, KeyCode::Char('e')) => {
                self.open_edit_event_form().await;
                true
            }
            (Page::Dashboard, KeyCode::Char('x') | KeyCode::Delete) => {
                self.request_delete_event().await;
                true
            }
            (Page::MusicAdmin, KeyCode::Char('c')) => {
                self.open_new_song_form().await;
                true
            }
            (Page::MusicAdmin, KeyCode::Char('e')) => {
                self.open_edit_song_form().await;
                true
            }
            (Page::MusicAdmin, KeyCode::Char('x') | KeyCode::Delete) => {
                self.request_delete_song().await;
                true
            }
            (Page::MusicAdmin, KeyCode::Char('/')) => {
                self.model.lock().await.set_search_active(true).await;
                true
            }
            _ => false,
        }
    }

    fn spawn_confirmed(&self, pending: PendingConfirm) {
        let controller = self.clone();
        tokio::spawn(async move {
            match pending {
                PendingConfirm::DeleteEvent { id, .. } => controller.delete_event(&id).await,
                PendingConfirm::DeleteSong { id, .. } => controller.delete_song(&id).await,
            }
        });
    }
}
