//! Song upload/update/delete from the music admin page

use crate::model::{FormKind, FormState, ItemAction, Page, PendingAction, PendingConfirm, SongUpload, TrackId};
use super::AppController;

impl AppController {
    pub async fn open_new_song_form(&self) {
        let mut form = FormState::new_song();
        form.editing = true;
        self.model.lock().await.set_form(Some(form)).await;
    }

    pub async fn open_edit_song_form(&self) {
        let model = self.model.lock().await;
        if let Some(entry) = model.get_selected_song().await {
            let mut form = FormState::edit_song(&entry.track);
            form.editing = true;
            model.set_form(Some(form)).await;
        }
    }

    /// Uploads or updates the song in the open form, then refetches the list
    pub async fn save_song_form(&self) {
        let model = self.model.lock().await;
        let Some(form) = model.get_form().await else {
            return;
        };
        let FormKind::Song { editing } = form.kind.clone() else {
            return;
        };
        if form.submitting {
            return;
        }

        let upload = match form.to_song_upload() {
            Ok(upload) => upload,
            Err(e) => {
                model.set_error(e.to_string()).await;
                return;
            }
        };

        let session = model.get_session().await;
        model.update_form(|f| f.submitting = true).await;
        drop(model);

        let upload = fill_duration(upload).await;

        let result = match &editing {
            Some(id) => self.api.update_song(session.as_ref(), id, &upload).await,
            None => self.api.upload_song(session.as_ref(), &upload).await,
        };

        let model = self.model.lock().await;
        model.update_form(|f| f.submitting = false).await;
        match result {
            Ok(stored) => {
                tracing::info!(
                    title = %upload.title,
                    id = ?stored.map(|t| t.id),
                    updated = editing.is_some(),
                    "Song saved"
                );
                model.set_form(None).await;
                let text = if editing.is_some() {
                    "Canción actualizada"
                } else {
                    "Canción subida exitosamente"
                };
                model.set_success(text.to_string()).await;
                drop(model);
                self.refresh_songs().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Saving song failed");
                model
                    .set_error(format!("Error al procesar la canción: {}", Self::format_error(&e)))
                    .await;
            }
        }
    }

    pub async fn request_delete_song(&self) {
        let model = self.model.lock().await;
        if let Some(entry) = model.get_selected_song().await {
            if entry.is_pending() {
                return;
            }
            model
                .set_confirm(PendingConfirm::DeleteSong {
                    id: entry.track.id,
                    title: entry.track.title,
                })
                .await;
        }
    }

    pub async fn delete_song(&self, id: &TrackId) {
        let session = {
            let model = self.model.lock().await;
            model
                .set_song_action(id, ItemAction::Pending(PendingAction::Deleting))
                .await;
            model.get_session().await
        };

        let result = self.api.delete_song(session.as_ref(), id).await;

        let model = self.model.lock().await;
        match result {
            Ok(()) => {
                tracing::info!(id = %id, "Song deleted");
                model.set_success("Canción eliminada exitosamente".to_string()).await;
                drop(model);
                self.refresh_songs().await;
            }
            Err(e) => {
                tracing::error!(id = %id, error = %e, "Deleting song failed");
                model.set_song_action(id, ItemAction::Idle).await;
                model
                    .set_error(format!("Error al eliminar la canción: {}", Self::format_error(&e)))
                    .await;
            }
        }
    }

    /// Refetches `/api/music` for whichever song page is open
    async fn refresh_songs(&self) {
        let model = self.model.lock().await;
        let page = model.current_page().await;
        if !matches!(page, Page::MusicAdmin | Page::MusicCatalog) {
            return;
        }
        let generation = model.begin_reload().await;
        drop(model);
        self.load_songs(page, generation).await;
    }
}

/// Probes the audio file for its length when the form left it blank
#[cfg(feature = "audio")]
async fn fill_duration(mut upload: SongUpload) -> SongUpload {
    if !upload.duration.is_empty() {
        return upload;
    }
    let Some(path) = upload.audio.clone() else {
        return upload;
    };
    let probe_path = path.clone();
    // Decoding reads the whole file
    let probed = tokio::task::spawn_blocking(move || crate::audio::probe_duration(&probe_path)).await;
    match probed {
        Ok(Some(duration)) => {
            upload.duration = crate::model::format_clock(duration.as_secs());
            tracing::debug!(path = %path.display(), duration = %upload.duration, "Filled song duration");
        }
        Ok(None) => tracing::debug!(path = %path.display(), "Could not probe song duration"),
        Err(e) => tracing::warn!(error = %e, "Duration probe task failed"),
    }
    upload
}

#[cfg(not(feature = "audio"))]
async fn fill_duration(upload: SongUpload) -> SongUpload {
    upload
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(duration: &str, audio: Option<std::path::PathBuf>) -> SongUpload {
        SongUpload {
            title: "Demo".to_string(),
            artist: "La Banda".to_string(),
            album: String::new(),
            duration: duration.to_string(),
            audio,
            cover: None,
        }
    }

    #[tokio::test]
    async fn typed_duration_is_kept() {
        let filled = fill_duration(upload("4:05", Some("/no/such/file.mp3".into()))).await;
        assert_eq!(filled.duration, "4:05");
    }

    #[cfg(feature = "audio")]
    #[tokio::test]
    async fn unreadable_audio_leaves_duration_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ruido.mp3");
        std::fs::write(&path, b"not audio").unwrap();
        let filled = fill_duration(upload("", Some(path))).await;
        assert_eq!(filled.duration, "");
    }
}
