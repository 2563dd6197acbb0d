//! Playback through the default sound device
//!
//! Sources are fetched and decoded whole on a loader thread (symphonia), then
//! rendered by the cpal callback with linear resampling to the device rate.
//! The cpal stream lives on its own thread because it is not `Send`.

use std::io::Cursor;
use std::path::Path;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::{MediaSource, MediaSourceStream},
    meta::MetadataOptions,
    probe::Hint,
};

use super::{AudioOutput, MediaEvent, MediaEventKind, MediaEventSender};
use crate::error::AudioError;
use crate::model::Track;

/// Callback-side state. Samples are interleaved stereo at `source_rate`.
struct Shared {
    generation: u64,
    samples: Arc<Vec<f32>>,
    source_rate: u32,
    /// Read position in source frames
    cursor: f64,
    last_report: f64,
    playing: bool,
    ended_sent: bool,
    volume: f32,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            generation: 0,
            samples: Arc::new(Vec::new()),
            source_rate: 44_100,
            cursor: 0.0,
            last_report: 0.0,
            playing: false,
            ended_sent: false,
            volume: 1.0,
        }
    }
}

impl Shared {
    fn total_frames(&self) -> usize {
        self.samples.len() / 2
    }
}

pub struct DeviceOutput {
    shared: Arc<Mutex<Shared>>,
    events: MediaEventSender,
    device_name: String,
    // Dropping the sender releases the stream thread
    _shutdown: std_mpsc::Sender<()>,
}

impl DeviceOutput {
    pub fn open(events: MediaEventSender) -> Result<Self, AudioError> {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<String, String>>();
        let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();

        let shared_cb = Arc::clone(&shared);
        let events_cb = events.clone();
        thread::Builder::new()
            .name("audio-out".to_string())
            .spawn(move || {
                let stream = match build_stream(shared_cb, events_cb) {
                    Ok((stream, name)) => {
                        let _ = ready_tx.send(Ok(name));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = shutdown_rx.recv();
                drop(stream);
                tracing::debug!("Audio stream closed");
            })
            .map_err(|e| AudioError::Device(format!("cannot spawn audio thread: {e}")))?;

        let device_name = ready_rx
            .recv()
            .map_err(|_| AudioError::Device("audio thread exited".to_string()))?
            .map_err(AudioError::Device)?;

        Ok(Self {
            shared,
            events,
            device_name,
            _shutdown: shutdown_tx,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    fn state(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioOutput for DeviceOutput {
    fn load(&mut self, track: &Track, generation: u64) -> Result<(), AudioError> {
        {
            let mut state = self.state();
            state.generation = generation;
            state.samples = Arc::new(Vec::new());
            state.cursor = 0.0;
            state.last_report = 0.0;
            state.playing = false;
            state.ended_sent = false;
        }

        let url = track.audio_url.clone();
        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        thread::Builder::new()
            .name("audio-load".to_string())
            .spawn(move || {
                let result = fetch_and_decode(&url);
                let mut state = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if state.generation != generation {
                    tracing::debug!(url = %url, "Discarding decode for a replaced source");
                    return;
                }
                let kind = match result {
                    Ok((samples, rate)) => {
                        let duration = Duration::from_secs_f64((samples.len() / 2) as f64 / rate as f64);
                        state.samples = Arc::new(samples);
                        state.source_rate = rate;
                        state.cursor = 0.0;
                        tracing::info!(url = %url, secs = duration.as_secs(), "Decoded audio source");
                        MediaEventKind::LoadedMetadata(duration)
                    }
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "Audio source failed to load");
                        MediaEventKind::Error(e)
                    }
                };
                drop(state);
                let _ = events.send(MediaEvent { generation, kind });
            })
            .map_err(|e| AudioError::Load {
                source_url: track.audio_url.clone(),
                reason: format!("cannot spawn loader: {e}"),
            })?;

        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let mut state = self.state();
        if state.total_frames() > 0 && state.cursor as usize + 1 >= state.total_frames() {
            state.cursor = 0.0;
        }
        state.playing = true;
        state.ended_sent = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.state().playing = false;
    }

    fn stop(&mut self) {
        let mut state = self.state();
        state.playing = false;
        state.samples = Arc::new(Vec::new());
        state.cursor = 0.0;
    }

    fn seek(&mut self, position: Duration) -> Result<(), AudioError> {
        let mut state = self.state();
        if state.samples.is_empty() {
            return Err(AudioError::Seek("source still loading".to_string()));
        }
        let target = position.as_secs_f64() * state.source_rate as f64;
        state.cursor = target.clamp(0.0, state.total_frames().saturating_sub(1) as f64);
        state.last_report = state.cursor;
        state.ended_sent = false;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.state().volume = volume.clamp(0.0, 1.0);
    }

    fn name(&self) -> &str {
        &self.device_name
    }
}

fn build_stream(
    shared: Arc<Mutex<Shared>>,
    events: MediaEventSender,
) -> Result<(cpal::Stream, String), String> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or("no default audio output device")?;
    let supported = device
        .default_output_config()
        .map_err(|e| format!("default config: {e}"))?;

    let device_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let config: cpal::StreamConfig = supported.into();
    let name = device.name().unwrap_or_else(|_| "default".to_string());

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                render(data, channels, device_rate, &shared, &events);
            },
            |err| tracing::warn!(error = %err, "Audio stream error"),
            None,
        )
        .map_err(|e| format!("build stream: {e}"))?;
    stream.play().map_err(|e| format!("start stream: {e}"))?;

    tracing::info!(device = %name, device_rate, channels, "Audio device opened");
    Ok((stream, name))
}

fn render(
    data: &mut [f32],
    channels: usize,
    device_rate: u32,
    shared: &Mutex<Shared>,
    events: &MediaEventSender,
) {
    data.fill(0.0);
    // Never block the device thread; a busy lock costs one silent buffer
    let Ok(mut state) = shared.try_lock() else {
        return;
    };
    if !state.playing || state.samples.is_empty() || channels == 0 {
        return;
    }

    let samples = Arc::clone(&state.samples);
    let total_frames = state.total_frames();
    let step = state.source_rate as f64 / device_rate as f64;
    let volume = state.volume;
    let mut ended = false;

    for frame in data.chunks_mut(channels) {
        let index = state.cursor as usize;
        if index + 1 >= total_frames {
            ended = true;
            break;
        }
        let frac = (state.cursor - index as f64) as f32;
        let l = lerp(samples[index * 2], samples[index * 2 + 2], frac) * volume;
        let r = lerp(samples[index * 2 + 1], samples[index * 2 + 3], frac) * volume;
        if channels == 1 {
            frame[0] = (l + r) * 0.5;
        } else {
            frame[0] = l;
            frame[1] = r;
        }
        state.cursor += step;
    }

    let generation = state.generation;
    let rate = state.source_rate as f64;
    if ended {
        state.playing = false;
        if !state.ended_sent {
            state.ended_sent = true;
            let _ = events.send(MediaEvent {
                generation,
                kind: MediaEventKind::Ended,
            });
        }
    } else if state.cursor - state.last_report >= rate / 4.0 {
        state.last_report = state.cursor;
        let _ = events.send(MediaEvent {
            generation,
            kind: MediaEventKind::TimeUpdate(Duration::from_secs_f64(state.cursor / rate)),
        });
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn extension_of(location: &str) -> Option<&str> {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    let ext = path.rsplit_once('.')?.1;
    (ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

/// Fetches (http/https) or reads (local path) a source and decodes it fully
fn fetch_and_decode(location: &str) -> Result<(Vec<f32>, u32), String> {
    let bytes = if location.starts_with("http://") || location.starts_with("https://") {
        let response = reqwest::blocking::get(location)
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("download failed: {e}"))?;
        response
            .bytes()
            .map_err(|e| format!("download failed: {e}"))?
            .to_vec()
    } else {
        std::fs::read(location).map_err(|e| format!("cannot read {location}: {e}"))?
    };
    decode_all(Box::new(Cursor::new(bytes)), extension_of(location))
}

fn decode_all(source: Box<dyn MediaSource>, extension: Option<&str>) -> Result<(Vec<f32>, u32), String> {
    let mss = MediaSourceStream::new(source, Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }
    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| format!("probe failed: {e}"))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or("no audio track found")?
        .clone();
    let track_id = track.id;
    let rate = track.codec_params.sample_rate.unwrap_or(44_100);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| format!("codec init: {e}"))?;

    let mut samples = Vec::new();
    loop {
        let packet = match probed.format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(format!("read failed: {e}")),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!(error = %e, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(format!("decode failed: {e}")),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        for frame in buf.samples().chunks(channels) {
            let l = frame[0];
            let r = if channels > 1 { frame[1] } else { frame[0] };
            samples.push(l);
            samples.push(r);
        }
    }

    if samples.len() < 4 {
        return Err("no audio decoded".to_string());
    }
    Ok((samples, rate))
}

/// Reads the container header of a local file to estimate its duration
pub fn probe_duration(path: &Path) -> Option<Duration> {
    let file = std::fs::File::open(path).ok()?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .ok()?;
    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)?;
    let frames = track.codec_params.n_frames?;
    let rate = track.codec_params.sample_rate?;
    (rate > 0).then(|| Duration::from_secs(frames / rate as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_ignores_query_strings() {
        assert_eq!(extension_of("https://cdn.example/a/song.mp3?sig=1"), Some("mp3"));
        assert_eq!(extension_of("/music/track.flac"), Some("flac"));
        assert_eq!(extension_of("https://cdn.example/stream"), None);
    }
}
