//! Page switching, page loads and the music catalog

use crate::model::{can_access, FormState, ItemAction, Page, PendingAction};
use super::AppController;

impl AppController {
    /// Opens `page` if the session allows it and starts its load
    pub async fn go_to(&self, page: Page) {
        let model = self.model.lock().await;
        let session = model.get_session().await;
        if !can_access(session.as_ref(), page) {
            tracing::info!(page = ?page, "Page requires an admin session");
            model
                .set_error("Necesitás una cuenta de administrador para ver esta página.".to_string())
                .await;
            if session.is_none() {
                model.navigate(Page::Login).await;
                model.set_form(Some(FormState::login())).await;
            }
            return;
        }

        let generation = model.navigate(page).await;
        match page {
            Page::Login => model.set_form(Some(FormState::login())).await,
            Page::Register => model.set_form(Some(FormState::register())).await,
            _ => {}
        }
        drop(model);

        self.spawn_page_load(page, generation);
    }

    /// Tab order, skipping pages the session cannot open
    pub async fn cycle_page(&self, forward: bool) {
        let (current, session) = {
            let model = self.model.lock().await;
            (model.current_page().await, model.get_session().await)
        };

        let mut page = current;
        for _ in 0..Page::NAV.len() {
            page = if forward { page.next() } else { page.prev() };
            let hidden = !can_access(session.as_ref(), page)
                || (page == Page::Login && session.is_some());
            if !hidden {
                break;
            }
        }
        if page != current {
            self.go_to(page).await;
        }
    }

    pub async fn reload_current_page(&self) {
        let model = self.model.lock().await;
        let page = model.current_page().await;
        let generation = model.begin_reload().await;
        drop(model);
        self.spawn_page_load(page, generation);
    }

    fn spawn_page_load(&self, page: Page, generation: u64) {
        let controller = self.clone();
        match page {
            Page::Home | Page::Events | Page::Dashboard => {
                tokio::spawn(async move {
                    controller.load_events(page, generation).await;
                });
            }
            Page::MusicCatalog | Page::MusicAdmin => {
                tokio::spawn(async move {
                    controller.load_songs(page, generation).await;
                });
            }
            _ => {}
        }
    }

    async fn mark_loading(&self, page: Page, generation: u64) {
        let model = self.model.lock().await;
        if model.is_current_load(page, generation).await {
            model.set_loading(true).await;
        }
    }

    pub async fn load_events(&self, page: Page, generation: u64) {
        self.mark_loading(page, generation).await;
        let result = self.api.list_events().await;

        let model = self.model.lock().await;
        if !model.is_current_load(page, generation).await {
            tracing::debug!(page = ?page, generation, "Discarding events for a page that was left");
            return;
        }
        model.set_loading(false).await;
        match result {
            Ok(events) => {
                tracing::info!(count = events.len(), "Events loaded");
                model.set_events(events).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Loading events failed");
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }

    pub async fn load_songs(&self, page: Page, generation: u64) {
        self.mark_loading(page, generation).await;
        let result = self.api.list_songs().await;

        let model = self.model.lock().await;
        if !model.is_current_load(page, generation).await {
            tracing::debug!(page = ?page, generation, "Discarding songs for a page that was left");
            return;
        }
        model.set_loading(false).await;
        match result {
            Ok(tracks) => {
                tracing::info!(count = tracks.len(), "Songs loaded");
                model.set_songs(tracks).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Loading songs failed");
                model
                    .set_error(format!("No se pudieron cargar las canciones: {}", Self::format_error(&e)))
                    .await;
            }
        }
    }

    /// Adds the selected catalog song to the playlist, or removes it when present
    pub async fn toggle_selected_in_playlist(&self) {
        let model = self.model.lock().await;
        let Some(entry) = model.get_selected_song().await else {
            return;
        };
        if entry.is_pending() {
            return;
        }

        let id = entry.track.id.clone();
        let present = model.playlist_contains(&id).await;
        let action = if present { PendingAction::Removing } else { PendingAction::Adding };
        model.set_song_action(&id, ItemAction::Pending(action)).await;

        let snapshot = if present {
            model.remove_from_playlist(&id).await
        } else {
            model.add_to_playlist(entry.track.clone()).await
        };
        model.set_song_action(&id, ItemAction::Idle).await;
        drop(model);

        if let Some(tracks) = snapshot {
            tracing::info!(track_id = %id, added = !present, len = tracks.len(), "Playlist changed");
            self.sync_playlist(tracks).await;
        }
    }

    pub async fn play_selected_song(&self) {
        let entry = self.model.lock().await.get_selected_song().await;
        if let Some(entry) = entry {
            self.play_track(entry.track).await;
        }
    }
}
