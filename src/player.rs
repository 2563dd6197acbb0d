//! Playback state machine bound to the playlist
//!
//! `PlayerEngine` owns one [`AudioOutput`] and a snapshot of the playlist.
//! The current track is held by identity; its index is derived on demand, so
//! removing entries before it never leaves a stale position behind.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audio::{AudioOutput, MediaEvent, MediaEventKind};
use crate::error::AudioError;
use crate::model::{PlayerState, PlayerStatus, Track, TrackId};

pub struct PlayerEngine<O = Box<dyn AudioOutput>> {
    output: O,
    playlist: Vec<Track>,
    current: Option<TrackId>,
    status: PlayerStatus,
    elapsed: Duration,
    duration: Duration,
    volume: f32,
    last_audible: f32,
    muted: bool,
    shuffle: bool,
    repeat: bool,
    /// Bumped on every load; media events from older loads are ignored
    generation: u64,
    consecutive_failures: usize,
    rng: StdRng,
}

impl<O: AudioOutput> PlayerEngine<O> {
    pub fn new(output: O, volume_percent: u8) -> Self {
        Self::with_rng(output, volume_percent, StdRng::from_entropy())
    }

    pub fn with_rng(mut output: O, volume_percent: u8, rng: StdRng) -> Self {
        let volume = f32::from(volume_percent.min(100)) / 100.0;
        output.set_volume(volume);
        Self {
            output,
            playlist: Vec::new(),
            current: None,
            status: PlayerStatus::Empty,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
            volume,
            last_audible: if volume > 0.0 { volume } else { 1.0 },
            muted: volume == 0.0,
            shuffle: false,
            repeat: false,
            generation: 0,
            consecutive_failures: 0,
            rng,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn current_index(&self) -> Option<usize> {
        let id = self.current.as_ref()?;
        self.playlist.iter().position(|t| &t.id == id)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index().map(|i| &self.playlist[i])
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> PlayerState {
        PlayerState {
            status: self.status,
            track: self.current_track().cloned(),
            index: self.current_index(),
            elapsed: self.elapsed,
            duration: self.duration,
            volume: self.volume,
            muted: self.muted,
            shuffle: self.shuffle,
            repeat: self.repeat,
            playlist_len: self.playlist.len(),
        }
    }

    /// Makes the track at `index` current and starts it
    pub fn select_track(&mut self, index: usize) {
        self.consecutive_failures = 0;
        self.load_index(index);
    }

    fn load_index(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index).cloned() else {
            tracing::warn!(index, len = self.playlist.len(), "Track index out of range");
            return;
        };
        self.activate(track);
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), AudioError> {
        if self.playlist.is_empty() || self.current_track().is_none() {
            return Ok(());
        }
        match self.status {
            PlayerStatus::Playing => {
                self.output.pause();
                self.status = PlayerStatus::Paused;
                tracing::debug!("Playback paused");
                Ok(())
            }
            PlayerStatus::Paused | PlayerStatus::Idle => self.start_output(),
            PlayerStatus::Empty => Ok(()),
        }
    }

    pub fn next(&mut self) {
        self.consecutive_failures = 0;
        self.advance(1);
    }

    pub fn previous(&mut self) {
        self.consecutive_failures = 0;
        self.advance(-1);
    }

    /// Steps without touching the failure count, so automatic skips can give up
    fn advance(&mut self, delta: isize) {
        match self.step_target(delta) {
            Some(index) => self.load_index(index),
            None => self.stop(),
        }
    }

    /// Replaces the playlist snapshot after any add/remove
    pub fn on_playlist_changed(&mut self, tracks: Vec<Track>) {
        let same_members = tracks.len() == self.playlist.len()
            && tracks.iter().zip(&self.playlist).all(|(a, b)| a.id == b.id);
        if !same_members {
            self.consecutive_failures = 0;
        }
        self.playlist = tracks;

        if self.playlist.is_empty() {
            if self.status != PlayerStatus::Empty {
                tracing::info!("Playlist emptied, stopping playback");
            }
            self.stop();
            return;
        }

        if self.current.is_some() && self.current_index().is_none() {
            tracing::info!("Current track left the playlist, switching to the first entry");
            self.select_track(0);
        }
    }

    pub fn on_track_ended(&mut self) {
        if self.repeat && self.current_track().is_some() {
            tracing::debug!("Repeating current track");
            if let Err(e) = self.output.seek(Duration::ZERO) {
                tracing::warn!(error = %e, "Cannot rewind for repeat");
            }
            self.elapsed = Duration::ZERO;
            // A rejected replay leaves the engine idle; the error is already logged
            let _ = self.start_output();
        } else if self.playlist.is_empty() {
            self.stop();
        } else {
            self.next();
        }
    }

    pub fn on_track_load_error(&mut self) {
        self.consecutive_failures += 1;
        if self.playlist.len() > 1 && self.consecutive_failures < self.playlist.len() {
            self.advance(1);
        } else {
            tracing::warn!(
                failures = self.consecutive_failures,
                len = self.playlist.len(),
                "No playable track left, stopping"
            );
            self.stop();
        }
    }

    /// `percent` is clamped to 0..=100; zero mutes, anything else unmutes
    pub fn set_volume(&mut self, percent: u8) {
        let volume = f32::from(percent.min(100)) / 100.0;
        self.volume = volume;
        self.muted = volume == 0.0;
        if volume > 0.0 {
            self.last_audible = volume;
        }
        self.apply_volume();
    }

    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            if self.volume == 0.0 {
                self.volume = self.last_audible;
            }
        } else {
            self.muted = true;
        }
        self.apply_volume();
    }

    /// Moves to `fraction` (0.0..=1.0) of the current track
    pub fn seek(&mut self, fraction: f64) {
        if self.current_track().is_none() || self.duration.is_zero() {
            return;
        }
        let target = self.duration.mul_f64(fraction.clamp(0.0, 1.0));
        match self.output.seek(target) {
            Ok(()) => self.elapsed = target,
            Err(e) => tracing::warn!(error = %e, "Seek failed"),
        }
    }

    pub fn toggle_shuffle(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.shuffle = !self.shuffle;
    }

    pub fn toggle_repeat(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.repeat = !self.repeat;
    }

    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if event.generation != self.generation {
            tracing::trace!(
                event_generation = event.generation,
                current = self.generation,
                "Dropping stale media event"
            );
            return;
        }
        match event.kind {
            MediaEventKind::LoadedMetadata(duration) => {
                self.duration = duration;
                self.consecutive_failures = 0;
            }
            MediaEventKind::TimeUpdate(position) => {
                self.elapsed = position;
            }
            MediaEventKind::Ended => {
                self.elapsed = self.duration;
                self.on_track_ended();
            }
            MediaEventKind::Error(reason) => {
                tracing::warn!(reason = %reason, "Audio failed to load");
                self.on_track_load_error();
            }
        }
    }

    pub fn tick(&mut self) {
        self.output.tick();
    }

    /// Unloads the output and clears the current track
    pub fn stop(&mut self) {
        self.output.stop();
        self.generation += 1;
        self.consecutive_failures = 0;
        self.current = None;
        self.status = PlayerStatus::Empty;
        self.elapsed = Duration::ZERO;
        self.duration = Duration::ZERO;
    }

    fn step_target(&mut self, delta: isize) -> Option<usize> {
        let len = self.playlist.len();
        if len == 0 {
            return None;
        }
        if self.shuffle {
            return Some(self.rng.gen_range(0..len));
        }
        let target = match self.current_index() {
            Some(i) => (i as isize + delta).rem_euclid(len as isize) as usize,
            None => 0,
        };
        Some(target)
    }

    fn activate(&mut self, track: Track) {
        self.generation += 1;
        self.current = Some(track.id.clone());
        self.elapsed = Duration::ZERO;
        self.duration = track
            .duration_secs()
            .map(Duration::from_secs)
            .unwrap_or_default();
        self.status = PlayerStatus::Playing;

        tracing::info!(
            track_id = %track.id,
            title = %track.title,
            generation = self.generation,
            "Loading track"
        );

        if let Err(e) = self.output.load(&track, self.generation) {
            tracing::warn!(error = %e, "Output refused the source");
            self.status = PlayerStatus::Idle;
            return;
        }
        self.apply_volume();
        // Autoplay rejections are logged inside and leave the engine idle
        let _ = self.start_output();
    }

    fn start_output(&mut self) -> Result<(), AudioError> {
        match self.output.play() {
            Ok(()) => {
                self.status = PlayerStatus::Playing;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Playback did not start");
                self.status = PlayerStatus::Idle;
                Err(e)
            }
        }
    }

    fn apply_volume(&mut self) {
        let effective = if self.muted { 0.0 } else { self.volume };
        self.output.set_volume(effective);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::playlist::tests::track;

    #[derive(Default)]
    struct RecordingOutput {
        calls: Vec<String>,
        reject_play: bool,
        volume: f32,
    }

    impl AudioOutput for RecordingOutput {
        fn load(&mut self, track: &Track, generation: u64) -> Result<(), AudioError> {
            self.calls.push(format!("load {} #{}", track.id, generation));
            Ok(())
        }

        fn play(&mut self) -> Result<(), AudioError> {
            self.calls.push("play".into());
            if self.reject_play {
                Err(AudioError::PlaybackRejected("blocked".into()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.calls.push("pause".into());
        }

        fn stop(&mut self) {
            self.calls.push("stop".into());
        }

        fn seek(&mut self, position: Duration) -> Result<(), AudioError> {
            self.calls.push(format!("seek {}", position.as_secs()));
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn engine(ids: &[&str]) -> PlayerEngine<RecordingOutput> {
        let mut engine =
            PlayerEngine::with_rng(RecordingOutput::default(), 100, StdRng::seed_from_u64(1));
        engine.on_playlist_changed(ids.iter().map(|id| track(id)).collect());
        engine
    }

    fn current_id(engine: &PlayerEngine<RecordingOutput>) -> Option<String> {
        engine.current_track().map(|t| t.id.0.clone())
    }

    #[test]
    fn next_walks_the_playlist_and_wraps() {
        let mut engine = engine(&["a", "b", "c"]);
        engine.select_track(0);
        let mut seen = Vec::new();
        for _ in 0..3 {
            engine.next();
            seen.push(current_id(&engine).unwrap());
        }
        assert_eq!(seen, ["b", "c", "a"]);
    }

    #[test]
    fn n_nexts_return_to_start() {
        let mut engine = engine(&["a", "b", "c", "d", "e"]);
        engine.select_track(2);
        for _ in 0..5 {
            engine.next();
        }
        assert_eq!(engine.current_index(), Some(2));
    }

    #[test]
    fn previous_wraps_to_last() {
        let mut engine = engine(&["a", "b", "c"]);
        engine.select_track(0);
        engine.previous();
        assert_eq!(current_id(&engine).as_deref(), Some("c"));
    }

    #[test]
    fn next_without_current_starts_at_first() {
        let mut engine = engine(&["a", "b"]);
        assert_eq!(engine.status(), PlayerStatus::Empty);
        engine.next();
        assert_eq!(current_id(&engine).as_deref(), Some("a"));
        assert_eq!(engine.status(), PlayerStatus::Playing);
    }

    #[test]
    fn removing_last_track_empties_and_toggle_is_noop() {
        let mut engine = engine(&["a"]);
        engine.select_track(0);
        engine.on_playlist_changed(Vec::new());
        let state = engine.state();
        assert_eq!(state.status, PlayerStatus::Empty);
        assert!(state.track.is_none());
        assert_eq!(state.elapsed, Duration::ZERO);
        assert_eq!(state.duration, Duration::ZERO);

        let calls_before = engine.output().calls.len();
        engine.toggle_play_pause().unwrap();
        assert_eq!(engine.output().calls.len(), calls_before);
        assert_eq!(engine.status(), PlayerStatus::Empty);
    }

    #[test]
    fn removing_current_track_selects_first() {
        let mut engine = engine(&["a", "b", "c"]);
        engine.select_track(1);
        engine.on_playlist_changed(vec![track("a"), track("c")]);
        assert_eq!(current_id(&engine).as_deref(), Some("a"));
        assert_eq!(engine.status(), PlayerStatus::Playing);
    }

    #[test]
    fn removing_an_earlier_track_keeps_current_and_its_index_follows() {
        let mut engine = engine(&["a", "b", "c"]);
        engine.select_track(2);
        engine.on_playlist_changed(vec![track("b"), track("c")]);
        assert_eq!(current_id(&engine).as_deref(), Some("c"));
        assert_eq!(engine.current_index(), Some(1));
        engine.next();
        assert_eq!(current_id(&engine).as_deref(), Some("b"));
    }

    #[test]
    fn toggle_flips_between_playing_and_paused() {
        let mut engine = engine(&["a"]);
        engine.select_track(0);
        engine.toggle_play_pause().unwrap();
        assert_eq!(engine.status(), PlayerStatus::Paused);
        engine.toggle_play_pause().unwrap();
        assert_eq!(engine.status(), PlayerStatus::Playing);
    }

    #[test]
    fn rejected_autoplay_goes_idle_and_toggle_retries() {
        let mut engine = engine(&["a"]);
        engine.output.reject_play = true;
        engine.select_track(0);
        assert_eq!(engine.status(), PlayerStatus::Idle);
        assert!(engine.toggle_play_pause().is_err());

        engine.output.reject_play = false;
        engine.toggle_play_pause().unwrap();
        assert_eq!(engine.status(), PlayerStatus::Playing);
    }

    #[test]
    fn volume_zero_mutes_and_positive_unmutes() {
        let mut engine = engine(&["a"]);
        engine.set_volume(0);
        assert!(engine.state().muted);
        engine.set_volume(35);
        let state = engine.state();
        assert!(!state.muted);
        assert_eq!(state.volume_percent(), 35);
        assert!((engine.output().volume - 0.35).abs() < f32::EPSILON);
    }

    #[test]
    fn mute_toggle_restores_last_audible_level() {
        let mut engine = engine(&["a"]);
        engine.set_volume(60);
        engine.toggle_mute();
        assert_eq!(engine.output().volume, 0.0);
        engine.toggle_mute();
        assert!((engine.output().volume - 0.6).abs() < f32::EPSILON);

        engine.set_volume(0);
        engine.toggle_mute();
        assert!(!engine.state().muted);
        assert!((engine.output().volume - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn seek_maps_fraction_onto_duration() {
        let mut engine = engine(&["a"]);
        engine.seek(0.5);
        assert!(engine.output().calls.iter().all(|c| !c.starts_with("seek")));

        engine.select_track(0);
        engine.seek(0.5);
        assert_eq!(engine.output().calls.last().map(String::as_str), Some("seek 90"));
        assert_eq!(engine.state().elapsed, Duration::from_secs(90));
    }

    #[test]
    fn ended_with_repeat_restarts_same_track() {
        let mut engine = engine(&["a", "b"]);
        engine.select_track(0);
        engine.toggle_repeat();
        let generation = engine.generation();
        engine.handle_media_event(MediaEvent {
            generation,
            kind: MediaEventKind::Ended,
        });
        assert_eq!(current_id(&engine).as_deref(), Some("a"));
        assert_eq!(engine.state().elapsed, Duration::ZERO);
        let tail: Vec<_> = engine.output().calls.iter().rev().take(2).cloned().collect();
        assert_eq!(tail, ["play", "seek 0"]);
    }

    #[test]
    fn ended_without_repeat_advances() {
        let mut engine = engine(&["a", "b"]);
        engine.select_track(0);
        let generation = engine.generation();
        engine.handle_media_event(MediaEvent {
            generation,
            kind: MediaEventKind::Ended,
        });
        assert_eq!(current_id(&engine).as_deref(), Some("b"));
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut engine = engine(&["a", "b"]);
        engine.select_track(0);
        let stale = engine.generation();
        engine.next();
        engine.handle_media_event(MediaEvent {
            generation: stale,
            kind: MediaEventKind::Ended,
        });
        assert_eq!(current_id(&engine).as_deref(), Some("b"));
    }

    #[test]
    fn load_error_skips_then_gives_up() {
        let mut engine = engine(&["a", "b", "c"]);
        engine.select_track(0);
        for expected in ["b", "c"] {
            let generation = engine.generation();
            engine.handle_media_event(MediaEvent {
                generation,
                kind: MediaEventKind::Error("404".into()),
            });
            assert_eq!(current_id(&engine).as_deref(), Some(expected));
        }
        let generation = engine.generation();
        engine.handle_media_event(MediaEvent {
            generation,
            kind: MediaEventKind::Error("404".into()),
        });
        assert_eq!(engine.status(), PlayerStatus::Empty);
    }

    #[test]
    fn earlier_failures_do_not_stop_a_later_run() {
        let mut engine = engine(&["a", "b"]);
        engine.select_track(0);
        engine.on_track_load_error();
        engine.on_track_load_error();
        assert_eq!(engine.status(), PlayerStatus::Empty);

        engine.on_playlist_changed(vec![track("a"), track("b"), track("c")]);
        engine.select_track(0);
        engine.on_track_load_error();
        assert_eq!(engine.status(), PlayerStatus::Playing);
        assert_eq!(current_id(&engine).as_deref(), Some("b"));
    }

    #[test]
    fn user_selection_restarts_the_failure_run() {
        let mut engine = engine(&["a", "b", "c"]);
        engine.select_track(0);
        engine.on_track_load_error();
        engine.on_track_load_error();
        assert_eq!(current_id(&engine).as_deref(), Some("c"));

        // Same playlist, so only the selection clears the count
        engine.select_track(0);
        engine.on_track_load_error();
        assert_eq!(current_id(&engine).as_deref(), Some("b"));
        assert_eq!(engine.status(), PlayerStatus::Playing);
    }

    #[test]
    fn load_error_with_single_track_stops() {
        let mut engine = engine(&["a"]);
        engine.select_track(0);
        engine.on_track_load_error();
        assert_eq!(engine.status(), PlayerStatus::Empty);
    }

    #[test]
    fn shuffle_and_repeat_ignored_on_empty_playlist() {
        let mut engine = engine(&[]);
        engine.toggle_shuffle();
        engine.toggle_repeat();
        let state = engine.state();
        assert!(!state.shuffle);
        assert!(!state.repeat);
    }

    #[test]
    fn shuffle_picks_indices_in_range() {
        let mut engine = engine(&["a", "b", "c"]);
        engine.toggle_shuffle();
        engine.select_track(0);
        for _ in 0..50 {
            engine.next();
            assert!(engine.current_index().is_some_and(|i| i < 3));
        }
    }

    #[test]
    fn metadata_updates_duration_and_time() {
        let mut engine = engine(&["a"]);
        engine.select_track(0);
        let generation = engine.generation();
        engine.handle_media_event(MediaEvent {
            generation,
            kind: MediaEventKind::LoadedMetadata(Duration::from_secs(200)),
        });
        engine.handle_media_event(MediaEvent {
            generation,
            kind: MediaEventKind::TimeUpdate(Duration::from_secs(50)),
        });
        let state = engine.state();
        assert_eq!(state.duration, Duration::from_secs(200));
        assert!((state.progress_ratio() - 0.25).abs() < 1e-9);
    }
}
