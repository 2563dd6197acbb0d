//! Player control methods

use std::time::Duration;

use crate::model::{PlayerState, Track};
use super::AppController;

const VOLUME_STEP: u8 = 10;
const SEEK_STEP: Duration = Duration::from_secs(10);

impl AppController {
    pub async fn toggle_playback(&self) {
        let result = self.player.lock().await.toggle_play_pause();
        if let Err(e) = result {
            tracing::warn!(error = %e, "Toggle playback failed");
            self.model
                .lock()
                .await
                .set_error(format!("No se pudo reproducir: {e}"))
                .await;
        }
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        self.player.lock().await.next();
    }

    pub async fn previous_track(&self) {
        tracing::debug!("Going back to previous track");
        self.player.lock().await.previous();
    }

    pub async fn toggle_shuffle(&self) {
        let mut player = self.player.lock().await;
        player.toggle_shuffle();
        tracing::info!(shuffle = player.state().shuffle, "Shuffle toggled");
    }

    pub async fn toggle_repeat(&self) {
        let mut player = self.player.lock().await;
        player.toggle_repeat();
        tracing::info!(repeat = player.state().repeat, "Repeat toggled");
    }

    pub async fn volume_up(&self) {
        let mut player = self.player.lock().await;
        let current = player.state().volume_percent();
        player.set_volume(current.saturating_add(VOLUME_STEP).min(100));
    }

    pub async fn volume_down(&self) {
        let mut player = self.player.lock().await;
        let current = player.state().volume_percent();
        player.set_volume(current.saturating_sub(VOLUME_STEP));
    }

    pub async fn toggle_mute(&self) {
        self.player.lock().await.toggle_mute();
    }

    /// Jumps to a tenth of the track: 0 is the start, 9 is 90%
    pub async fn seek_to_tenth(&self, digit: u32) {
        self.player.lock().await.seek(f64::from(digit.min(10)) / 10.0);
    }

    pub async fn seek_forward(&self) {
        self.seek_by(SEEK_STEP.as_secs_f64()).await;
    }

    pub async fn seek_backward(&self) {
        self.seek_by(-SEEK_STEP.as_secs_f64()).await;
    }

    async fn seek_by(&self, delta_secs: f64) {
        let mut player = self.player.lock().await;
        let state = player.state();
        if state.duration.is_zero() {
            return;
        }
        let target = (state.elapsed.as_secs_f64() + delta_secs) / state.duration.as_secs_f64();
        player.seek(target);
    }

    /// Plays `track` from the playlist, adding it first when missing
    pub async fn play_track(&self, track: Track) {
        let id = track.id.clone();
        let (changed, playlist) = {
            let model = self.model.lock().await;
            let changed = model.add_to_playlist(track).await.is_some();
            (changed, model.get_playlist().await)
        };
        let index = playlist.iter().position(|t| t.id == id);

        let mut player = self.player.lock().await;
        if changed {
            player.on_playlist_changed(playlist);
        }
        if let Some(index) = index {
            player.select_track(index);
        }
    }

    /// Hands a changed playlist to the player
    pub(crate) async fn sync_playlist(&self, tracks: Vec<Track>) {
        self.player.lock().await.on_playlist_changed(tracks);
    }

    /// Called once per frame by the render loop
    pub async fn tick_player(&self) -> PlayerState {
        let mut player = self.player.lock().await;
        player.tick();
        player.state()
    }

    pub async fn stop_player(&self) {
        self.player.lock().await.stop();
    }
}
