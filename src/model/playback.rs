//! Playback state as seen by the rest of the application

use std::time::{Duration, Instant};

use super::content::Track;

/// Where the player is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    /// No current track (empty playlist, or nothing selected yet)
    #[default]
    Empty,
    /// A track is selected but not running; the next toggle starts it
    Idle,
    Playing,
    Paused,
}

impl PlayerStatus {
    pub fn is_playing(self) -> bool {
        self == PlayerStatus::Playing
    }
}

/// Snapshot of the player for rendering
#[derive(Clone, Debug)]
pub struct PlayerState {
    pub status: PlayerStatus,
    pub track: Option<Track>,
    /// Position of `track` in the playlist, derived from its identity
    pub index: Option<usize>,
    pub elapsed: Duration,
    pub duration: Duration,
    /// Level in [0, 1], kept while muted
    pub volume: f32,
    pub muted: bool,
    pub shuffle: bool,
    pub repeat: bool,
    pub playlist_len: usize,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            status: PlayerStatus::Empty,
            track: None,
            index: None,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
            volume: 1.0,
            muted: false,
            shuffle: false,
            repeat: false,
            playlist_len: 0,
        }
    }
}

impl PlayerState {
    pub fn progress_ratio(&self) -> f64 {
        if self.track.is_none() || self.duration.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn volume_percent(&self) -> u8 {
        if self.muted {
            0
        } else {
            (self.volume * 100.0).round().clamp(0.0, 100.0) as u8
        }
    }
}

/// Wall-clock position tracking between output reports
#[derive(Clone, Debug)]
pub struct PlaybackTiming {
    pub position: Duration,
    pub last_update: Instant,
    pub is_playing: bool,
    pub duration: Duration,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            position: Duration::ZERO,
            last_update: Instant::now(),
            is_playing: false,
            duration: Duration::ZERO,
        }
    }
}

impl PlaybackTiming {
    pub fn current_position(&self) -> Duration {
        if self.is_playing {
            let advanced = self.position.saturating_add(self.last_update.elapsed());
            if self.duration.is_zero() {
                advanced
            } else {
                advanced.min(self.duration)
            }
        } else {
            self.position
        }
    }

    pub fn set_position(&mut self, position: Duration) {
        self.position = position;
        self.last_update = Instant::now();
    }

    pub fn set_playing(&mut self, is_playing: bool) {
        // Freeze the running position before changing state
        self.position = self.current_position();
        self.last_update = Instant::now();
        self.is_playing = is_playing;
    }

    pub fn reset(&mut self, duration: Duration) {
        self.position = Duration::ZERO;
        self.last_update = Instant::now();
        self.is_playing = false;
        self.duration = duration;
    }

    pub fn finished(&self) -> bool {
        !self.duration.is_zero() && self.current_position() >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_timing_does_not_advance() {
        let mut timing = PlaybackTiming::default();
        timing.reset(Duration::from_secs(10));
        timing.set_position(Duration::from_secs(4));
        assert_eq!(timing.current_position(), Duration::from_secs(4));
        assert!(!timing.finished());
    }

    #[test]
    fn running_timing_is_capped_at_duration() {
        let mut timing = PlaybackTiming::default();
        timing.reset(Duration::from_secs(1));
        timing.set_position(Duration::from_secs(5));
        timing.set_playing(true);
        assert_eq!(timing.current_position(), Duration::from_secs(1));
        assert!(timing.finished());
    }

    #[test]
    fn muted_state_reports_zero_percent() {
        let state = PlayerState {
            volume: 0.7,
            muted: true,
            ..PlayerState::default()
        };
        assert_eq!(state.volume_percent(), 0);
    }
}
