//! Audio output seam
//!
//! The player engine drives exactly one [`AudioOutput`]. Outputs report
//! progress asynchronously through [`MediaEvent`]s stamped with the load
//! generation they belong to, so the engine can drop reports about a track
//! it has already moved away from.
//!
//! - `clock`: silent output that advances on the wall clock
//! - `device`: real playback through the default sound device (feature `audio`)

mod clock;
#[cfg(feature = "audio")]
mod device;

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::AudioError;
use crate::model::Track;

pub use clock::ClockOutput;
#[cfg(feature = "audio")]
pub use device::{probe_duration, DeviceOutput};

/// What happened to the loaded media
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEventKind {
    /// Duration became known
    LoadedMetadata(Duration),
    TimeUpdate(Duration),
    Ended,
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MediaEvent {
    pub generation: u64,
    pub kind: MediaEventKind,
}

pub type MediaEventSender = mpsc::UnboundedSender<MediaEvent>;
pub type MediaEventReceiver = mpsc::UnboundedReceiver<MediaEvent>;

pub fn media_event_channel() -> (MediaEventSender, MediaEventReceiver) {
    mpsc::unbounded_channel()
}

/// A single playback sink, the analogue of one browser media element.
pub trait AudioOutput: Send {
    /// Points the output at `track`, dropping whatever was loaded.
    /// Events for this source must carry `generation`.
    fn load(&mut self, track: &Track, generation: u64) -> Result<(), AudioError>;

    /// Starts or resumes the loaded source
    fn play(&mut self) -> Result<(), AudioError>;

    fn pause(&mut self);

    /// Pauses and unloads
    fn stop(&mut self);

    fn seek(&mut self, position: Duration) -> Result<(), AudioError>;

    /// Effective level in [0, 1]
    fn set_volume(&mut self, volume: f32);

    /// Called once per UI frame; outputs without their own thread report here
    fn tick(&mut self) {}

    fn name(&self) -> &str;
}

impl AudioOutput for Box<dyn AudioOutput> {
    fn load(&mut self, track: &Track, generation: u64) -> Result<(), AudioError> {
        (**self).load(track, generation)
    }

    fn play(&mut self) -> Result<(), AudioError> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn seek(&mut self, position: Duration) -> Result<(), AudioError> {
        (**self).seek(position)
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume)
    }

    fn tick(&mut self) {
        (**self).tick()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Picks the device output when available and wanted, the clock otherwise
pub fn open_output(events: MediaEventSender, silent: bool) -> Box<dyn AudioOutput> {
    #[cfg(feature = "audio")]
    {
        if !silent {
            match DeviceOutput::open(events.clone()) {
                Ok(output) => return Box::new(output),
                Err(e) => tracing::warn!(error = %e, "Audio device unavailable, using silent output"),
            }
        }
    }
    #[cfg(not(feature = "audio"))]
    {
        if !silent {
            tracing::info!("Built without the `audio` feature, using silent output");
        }
    }
    Box::new(ClockOutput::new(events))
}
