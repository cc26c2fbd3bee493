//! Playback queue
//!
//! An ordered list of track ids (never copies) and a cursor. The cursor
//! always points at a member, or is `None`. It is `None` when the queue is
//! empty or when the current track is not part of the listing (for example
//! after a genre filter excluded it).

use lyra_core::TrackId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Queue {
    ids: Vec<TrackId>,
    cursor: Option<usize>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from ids, dropping duplicates
    pub fn from_ids(ids: impl IntoIterator<Item = TrackId>) -> Self {
        let mut queue = Self::new();
        queue.replace(ids, None);
        queue
    }

    /// Replace the listing, keeping `current` under the cursor if it is
    /// still a member
    pub fn replace(&mut self, ids: impl IntoIterator<Item = TrackId>, current: Option<TrackId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
        self.cursor = current.and_then(|id| self.position_of(id));
    }

    /// Move the cursor to `id`. Returns false (and clears the cursor) if it
    /// is not a member.
    pub fn set_current(&mut self, id: TrackId) -> bool {
        self.cursor = self.position_of(id);
        self.cursor.is_some()
    }

    pub fn ids(&self) -> &[TrackId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<TrackId> {
        self.cursor.and_then(|i| self.ids.get(i).copied())
    }

    pub fn get(&self, index: usize) -> Option<TrackId> {
        self.ids.get(index).copied()
    }

    pub fn first(&self) -> Option<TrackId> {
        self.ids.first().copied()
    }

    fn position_of(&self, id: TrackId) -> Option<usize> {
        self.ids.iter().position(|x| *x == id)
    }
}
