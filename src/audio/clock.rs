//! Silent output driven by the wall clock
//!
//! Uses the track's advertised `m:ss` duration in place of decoded media,
//! which keeps the player usable on machines without a sound device.

use std::time::{Duration, Instant};

use super::{AudioOutput, MediaEvent, MediaEventKind, MediaEventSender};
use crate::error::AudioError;
use crate::model::{PlaybackTiming, Track};

const REPORT_INTERVAL: Duration = Duration::from_millis(250);

pub struct ClockOutput {
    events: MediaEventSender,
    timing: PlaybackTiming,
    generation: u64,
    loaded: bool,
    ended_sent: bool,
    last_report: Option<Instant>,
    volume: f32,
}

impl ClockOutput {
    pub fn new(events: MediaEventSender) -> Self {
        Self {
            events,
            timing: PlaybackTiming::default(),
            generation: 0,
            loaded: false,
            ended_sent: false,
            last_report: None,
            volume: 1.0,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn emit(&self, kind: MediaEventKind) {
        // A closed channel only means the app is shutting down
        let _ = self.events.send(MediaEvent {
            generation: self.generation,
            kind,
        });
    }
}

impl AudioOutput for ClockOutput {
    fn load(&mut self, track: &Track, generation: u64) -> Result<(), AudioError> {
        self.generation = generation;
        self.ended_sent = false;
        self.last_report = None;

        match track.duration_secs().filter(|secs| *secs > 0) {
            Some(secs) => {
                let duration = Duration::from_secs(secs);
                self.timing.reset(duration);
                self.loaded = true;
                tracing::debug!(track_id = %track.id, secs, "Clock output loaded track");
                self.emit(MediaEventKind::LoadedMetadata(duration));
            }
            None => {
                self.timing.reset(Duration::ZERO);
                self.loaded = false;
                tracing::warn!(track_id = %track.id, duration = %track.duration, "Track has no usable duration");
                self.emit(MediaEventKind::Error(format!(
                    "no usable duration for \"{}\"",
                    track.title
                )));
            }
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if !self.loaded {
            return Err(AudioError::PlaybackRejected("nothing loaded".to_string()));
        }
        if self.timing.finished() {
            self.timing.set_position(Duration::ZERO);
            self.ended_sent = false;
        }
        self.timing.set_playing(true);
        Ok(())
    }

    fn pause(&mut self) {
        self.timing.set_playing(false);
    }

    fn stop(&mut self) {
        self.loaded = false;
        self.ended_sent = false;
        self.timing.reset(Duration::ZERO);
    }

    fn seek(&mut self, position: Duration) -> Result<(), AudioError> {
        if !self.loaded {
            return Err(AudioError::Seek("nothing loaded".to_string()));
        }
        self.timing.set_position(position.min(self.timing.duration));
        self.ended_sent = false;
        self.last_report = None;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn tick(&mut self) {
        if !self.loaded || !self.timing.is_playing {
            return;
        }

        if self.timing.finished() {
            if !self.ended_sent {
                self.timing.set_playing(false);
                self.ended_sent = true;
                self.emit(MediaEventKind::TimeUpdate(self.timing.duration));
                self.emit(MediaEventKind::Ended);
            }
            return;
        }

        let due = self
            .last_report
            .is_none_or(|at| at.elapsed() >= REPORT_INTERVAL);
        if due {
            self.last_report = Some(Instant::now());
            self.emit(MediaEventKind::TimeUpdate(self.timing.current_position()));
        }
    }

    fn name(&self) -> &str {
        "silent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::media_event_channel;
    use crate::model::TrackId;

    fn track(duration: &str) -> Track {
        Track {
            id: TrackId::from("t"),
            title: "T".into(),
            artist: "A".into(),
            album: None,
            audio_url: "https://cdn.example/t.mp3".into(),
            cover_url: None,
            duration: duration.into(),
        }
    }

    #[test]
    fn load_reports_metadata_for_its_generation() {
        let (tx, mut rx) = media_event_channel();
        let mut output = ClockOutput::new(tx);
        output.load(&track("2:05"), 3).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            MediaEvent {
                generation: 3,
                kind: MediaEventKind::LoadedMetadata(Duration::from_secs(125)),
            }
        );
    }

    #[test]
    fn unusable_duration_is_a_load_error() {
        let (tx, mut rx) = media_event_channel();
        let mut output = ClockOutput::new(tx);
        output.load(&track("0:00"), 1).unwrap();
        assert!(matches!(rx.try_recv().unwrap().kind, MediaEventKind::Error(_)));
        assert!(output.play().is_err());
    }

    #[test]
    fn reaching_the_end_emits_ended_once() {
        let (tx, mut rx) = media_event_channel();
        let mut output = ClockOutput::new(tx);
        output.load(&track("0:02"), 1).unwrap();
        let _ = rx.try_recv();
        output.seek(Duration::from_secs(2)).unwrap();
        output.play().unwrap();
        // play() on a finished source restarts it; seek again while running
        output.seek(Duration::from_secs(2)).unwrap();
        output.tick();
        output.tick();
        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            [
                MediaEventKind::TimeUpdate(Duration::from_secs(2)),
                MediaEventKind::Ended
            ]
        );
    }
}
