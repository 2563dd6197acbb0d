//! The user-curated playlist

use super::content::{Track, TrackId};

/// A track together with its current position in the playlist.
/// Positions are recomputed on every read, never stored.
#[derive(Clone, Copy, Debug)]
pub struct PlaylistEntry<'a> {
    pub index: usize,
    pub track: &'a Track,
}

/// Ordered, de-duplicated set of tracks selected for playback.
///
/// Membership is by [`TrackId`] only; insertion order is the only ordering.
#[derive(Clone, Debug, Default)]
pub struct PlaylistStore {
    tracks: Vec<Track>,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `track` unless an entry with the same identity exists.
    /// Returns whether the playlist changed.
    pub fn add(&mut self, track: Track) -> bool {
        if self.contains(&track.id) {
            tracing::debug!(track_id = %track.id, "Track already in playlist");
            return false;
        }
        tracing::debug!(track_id = %track.id, title = %track.title, "Adding track to playlist");
        self.tracks.push(track);
        true
    }

    /// Removes every entry with identity `id`. Returns whether the playlist changed.
    pub fn remove(&mut self, id: &TrackId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| &t.id != id);
        let removed = self.tracks.len() != before;
        if removed {
            tracing::debug!(track_id = %id, "Removed track from playlist");
        }
        removed
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.tracks.iter().any(|t| &t.id == id)
    }

    pub fn position(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn entries(&self) -> impl Iterator<Item = PlaylistEntry<'_>> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, track)| PlaylistEntry { index, track })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
