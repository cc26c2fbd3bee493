//! In-memory track entries
//!
//! Fresh listings and detail records are merged into existing entries
//! rather than replacing the catalog, so ids held by the queue stay valid.

use lyra_core::{Track, TrackId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: HashMap<TrackId, Track>,
    // First-seen order
    order: Vec<TrackId>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh one entry
    pub fn upsert(&mut self, track: Track) {
        match self.tracks.get_mut(&track.id) {
            Some(existing) => existing.refresh_from(track),
            None => {
                self.order.push(track.id);
                self.tracks.insert(track.id, track);
            }
        }
    }

    /// Merge a listing. Returns its ids in listing order.
    pub fn merge(&mut self, tracks: Vec<Track>) -> Vec<TrackId> {
        let ids = tracks.iter().map(|t| t.id).collect();
        for track in tracks {
            self.upsert(track);
        }
        ids
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.order.iter().filter_map(|id| self.tracks.get(id))
    }
}
