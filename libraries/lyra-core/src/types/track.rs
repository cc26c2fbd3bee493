/// Track domain type
use crate::types::{PreferenceState, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playable media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Stable, unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Genre name as known to the catalog
    pub genre: Option<String>,

    /// Cover image reference
    pub cover_path: Option<String>,

    /// Audio resource reference handed to the transport
    pub audio_path: String,

    /// Duration in seconds; authoritative only after the transport loads the resource
    pub duration_secs: Option<f64>,

    /// Per-user preference marking
    pub preference: PreferenceState,

    /// Popularity counters from the detail endpoint
    pub stats: Option<TrackStats>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(id: TrackId, title: impl Into<String>, audio_path: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            artist: String::new(),
            genre: None,
            cover_path: None,
            audio_path: audio_path.into(),
            duration_secs: None,
            preference: PreferenceState::Unmarked,
            stats: None,
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.preference.is_favorite()
    }

    pub fn is_disliked(&self) -> bool {
        self.preference.is_disliked()
    }

    /// Get the track duration as a Duration
    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }

    /// Overwrite this entry's fields with a fresher record of the same track.
    ///
    /// Counters are only replaced when the fresher record carries them, since
    /// list responses omit them while detail responses include them.
    pub fn refresh_from(&mut self, fresh: Track) {
        debug_assert_eq!(self.id, fresh.id);
        let stats = fresh.stats.or(self.stats.take());
        *self = Track { stats, ..fresh };
    }
}

/// Counters returned alongside a track detail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStats {
    pub favorites_count: u64,
    pub dislikes_count: u64,
    pub reviews_count: u64,
}

/// Filter for track listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackQuery {
    /// Genre name; `None` lists every genre
    pub genre: Option<String>,
    /// Substring match against the artist name
    pub artist: Option<String>,
    /// Free-text match against title and artist
    pub search: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Genre label the UI uses for "no filter"
pub const ALL_GENRES: &str = "All";

impl TrackQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by genre. `"All"` and blank names clear the filter.
    #[must_use]
    pub fn with_genre(mut self, genre: Option<impl Into<String>>) -> Self {
        self.genre = genre
            .map(Into::into)
            .filter(|g: &String| !g.trim().is_empty() && g != ALL_GENRES);
        self
    }

    /// Filter by artist. Blank names clear the filter.
    #[must_use]
    pub fn with_artist(mut self, artist: Option<impl Into<String>>) -> Self {
        self.artist = artist
            .map(Into::into)
            .filter(|a: &String| !a.trim().is_empty());
        self
    }

    /// Filter by search text. Blank text clears the filter.
    #[must_use]
    pub fn with_search(mut self, search: Option<impl Into<String>>) -> Self {
        self.search = search
            .map(Into::into)
            .filter(|s: &String| !s.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32, size: u32) -> Self {
        self.page = Some(page.max(1));
        self.size = Some(size.clamp(1, 100));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_creation() {
        let track = Track::new(TrackId::new(1), "Test Song", "/media/tracks/a.mp3");
        assert_eq!(track.title, "Test Song");
        assert_eq!(track.preference, PreferenceState::Unmarked);
        assert!(track.duration().is_none());
    }

    #[test]
    fn refresh_keeps_counters_missing_from_list_records() {
        let mut cached = Track::new(TrackId::new(1), "Old", "/a.mp3");
        cached.stats = Some(TrackStats {
            favorites_count: 3,
            dislikes_count: 1,
            reviews_count: 0,
        });

        let mut fresh = Track::new(TrackId::new(1), "New", "/a.mp3");
        fresh.preference = PreferenceState::Favorited;
        cached.refresh_from(fresh);

        assert_eq!(cached.title, "New");
        assert!(cached.is_favorite());
        assert_eq!(cached.stats.map(|s| s.favorites_count), Some(3));
    }

    #[test]
    fn all_genre_means_no_filter() {
        let query = TrackQuery::new().with_genre(Some("All"));
        assert_eq!(query.genre, None);

        let query = TrackQuery::new().with_genre(Some("Jazz"));
        assert_eq!(query.genre.as_deref(), Some("Jazz"));

        let query = TrackQuery::new().with_search(Some("  "));
        assert_eq!(query.search, None);
    }

    #[test]
    fn blank_artist_clears_filter() {
        let query = TrackQuery::new().with_artist(Some("Nina"));
        assert_eq!(query.artist.as_deref(), Some("Nina"));
        assert_eq!(query.with_artist(Some("  ")).artist, None);
    }

    #[test]
    fn page_size_is_clamped() {
        let query = TrackQuery::new().with_page(0, 500);
        assert_eq!(query.page, Some(1));
        assert_eq!(query.size, Some(100));
    }
}
