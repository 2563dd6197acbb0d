//! Media event listener for the audio output

use crate::audio::{MediaEventKind, MediaEventReceiver};
use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut events: MediaEventReceiver) {
        let model = self.model.clone();
        let player = self.player.clone();
        tracing::info!("Starting media event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if model.lock().await.should_quit().await {
                    tracing::debug!("Media event listener shutting down");
                    break;
                }

                match &event.kind {
                    MediaEventKind::TimeUpdate(position) => {
                        tracing::trace!(generation = event.generation, secs = position.as_secs(), "TimeUpdate");
                    }
                    MediaEventKind::LoadedMetadata(duration) => {
                        tracing::debug!(generation = event.generation, secs = duration.as_secs(), "LoadedMetadata");
                    }
                    MediaEventKind::Ended => {
                        tracing::debug!(generation = event.generation, "Ended");
                    }
                    MediaEventKind::Error(reason) => {
                        tracing::warn!(generation = event.generation, reason = %reason, "Media error");
                    }
                }

                player.lock().await.handle_media_event(event);
            }
        });
    }
}
