//! Playback Controller
//!
//! Single authoritative holder of the current track, the queue and the
//! playback state. Composes the repository, session store, preference
//! synchronizer and transport behind one control surface.
//!
//! Ordering on a track change: the new id is persisted, the transport is
//! rebound, and only then is playback resumed. Detail fetches run without
//! holding the state lock and are committed only if the fetched track is
//! still current.

use crate::catalog::Catalog;
use crate::error::{PlaybackError, Result};
use crate::events::{EventStream, MediaEvent, TransportEvent};
use crate::navigator;
use crate::queue::Queue;
use crate::transport::{MediaBackend, PlaybackTransport};
use crate::types::{ErrorInfo, PlaybackConfig, PlaybackSnapshot, PlaybackState};
use lyra_core::{
    PreferenceKind, PreferenceService, PreferenceState, Session, SessionStore, Track, TrackId,
    TrackQuery, TrackRepository,
};
use lyra_storage::session;
use lyra_sync::{NotificationBus, PreferenceMode, PreferenceSynchronizer, Subscription};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Tracks requested per listing page
const LIST_PAGE_SIZE: u32 = 100;

/// Upper bound on pages read for one listing
const MAX_LIST_PAGES: u32 = 50;

struct State {
    transport: PlaybackTransport,
    catalog: Catalog,
    queue: Queue,
    current: Option<TrackId>,
    playback: PlaybackState,
    // Requested play/pause; `playback` is reconciled from transport results
    intent_playing: bool,
    repeat: bool,
    shuffle: bool,
    query: TrackQuery,
    last_error: Option<ErrorInfo>,
    session: Option<Session>,
    // Bumped per list request; only the latest response is applied
    list_generation: u64,
    rng: StdRng,
}

impl State {
    fn record(&mut self, error: &PlaybackError) {
        self.last_error = Some(ErrorInfo {
            kind: error.kind(),
            message: error.to_string(),
        });
    }
}

/// Orchestrator for playback, queue navigation and preferences
pub struct PlaybackController {
    inner: Mutex<State>,
    events: Mutex<EventStream>,
    repository: Arc<dyn TrackRepository>,
    store: Arc<dyn SessionStore>,
    sync: PreferenceSynchronizer,
}

impl PlaybackController {
    /// Create a controller around one media backend.
    ///
    /// Nothing is fetched until [`initialize`](Self::initialize).
    pub fn new(
        config: PlaybackConfig,
        repository: Arc<dyn TrackRepository>,
        preferences: Option<Arc<dyn PreferenceService>>,
        store: Arc<dyn SessionStore>,
        backend: Box<dyn MediaBackend>,
    ) -> Self {
        let (transport, events) = PlaybackTransport::new(backend, config.volume);
        let sync = PreferenceSynchronizer::new(
            NotificationBus::new(),
            Arc::clone(&store),
            preferences,
            config.allow_anonymous_preferences,
        )
        .with_repository(Arc::clone(&repository));

        Self {
            inner: Mutex::new(State {
                transport,
                catalog: Catalog::new(),
                queue: Queue::new(),
                current: None,
                playback: PlaybackState::Idle,
                intent_playing: false,
                repeat: config.repeat,
                shuffle: config.shuffle,
                query: TrackQuery::new(),
                last_error: None,
                session: None,
                list_generation: 0,
                rng: StdRng::from_entropy(),
            }),
            events: Mutex::new(events),
            repository,
            store,
            sync,
        }
    }

    /// Start with an authenticated session
    #[must_use]
    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.inner.get_mut().session = session;
        self
    }

    /// Use a fixed random source for shuffle
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.inner.get_mut().rng = rng;
        self
    }

    /// Load the track list and resolve the initial track.
    ///
    /// The persisted last track is preferred; if it is missing or cannot be
    /// fetched, the first track of the list is used. Nothing starts playing.
    /// Failures are recorded in the snapshot and never abort startup. A track
    /// selected while startup is still resolving wins over both.
    pub async fn initialize(&self) {
        let token = {
            let mut state = self.inner.lock().await;
            state.transport.init().await;
            state.session.as_ref().map(|s| s.token().to_string())
        };
        let authenticated = token.is_some();
        self.repository.set_credential(token).await;
        self.switch_preferences(authenticated).await;

        // Recorded in the snapshot on failure
        let _ = self.refresh_list().await;

        let persisted = match session::current_track_id(self.store.as_ref()).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted track id");
                None
            }
        };

        if let Some(id) = persisted {
            match self.repository.fetch_detail(id).await {
                Ok(track) => {
                    let mut state = self.inner.lock().await;
                    if let Some(current) = state.current {
                        debug!(
                            track_id = %id,
                            %current,
                            "Track already selected, discarding restored track"
                        );
                        return;
                    }
                    self.sync.observe(&track);
                    state.catalog.upsert(track);
                    info!(track_id = %id, "Restoring last track");
                    // Errors are recorded by change_track
                    let _ = self.change_track(&mut state, id).await;
                    return;
                }
                Err(e) => {
                    warn!(track_id = %id, error = %e, "Persisted track unavailable, using first listed");
                }
            }
        }

        let first = {
            let mut state = self.inner.lock().await;
            if state.current.is_some() {
                return;
            }
            let Some(first) = state.queue.first() else {
                debug!("Track list empty, staying idle");
                return;
            };
            if self.change_track(&mut state, first).await.is_err() {
                return;
            }
            first
        };
        self.refresh_detail(first).await;
    }

    // ===== Session =====

    /// Apply a login or logout.
    ///
    /// Switches the credential and the preference mode, refetches the list
    /// and refreshes the current track.
    pub async fn set_session(&self, session: Option<Session>) -> Result<()> {
        let token = session.as_ref().map(|s| s.token().to_string());
        let authenticated = token.is_some();
        let current = {
            let mut state = self.inner.lock().await;
            state.session = session;
            state.current
        };

        info!(authenticated, "Session changed");
        self.repository.set_credential(token).await;
        self.switch_preferences(authenticated).await;

        let listed = self.refresh_list().await;
        if let Some(id) = current {
            self.refresh_detail(id).await;
        }
        listed
    }

    async fn switch_preferences(&self, authenticated: bool) {
        if let Err(e) = self.sync.switch_mode(authenticated).await {
            warn!(error = %e, "Failed to switch preference mode");
            self.inner.lock().await.record(&e.into());
        }
    }

    // ===== Track List =====

    /// Refetch the listing for the current filter.
    ///
    /// Every page is read, so the queue covers the whole listing. Entries
    /// are merged into the catalog. On failure the previous list stays
    /// intact and the error is recorded.
    pub async fn refresh_list(&self) -> Result<()> {
        let (generation, query) = {
            let mut state = self.inner.lock().await;
            state.list_generation += 1;
            (state.list_generation, state.query.clone())
        };

        let result = self.fetch_all(&query).await;

        let mut state = self.inner.lock().await;
        if state.list_generation != generation {
            debug!(generation, "Newer list request pending, discarding response");
            return Ok(());
        }

        match result {
            Ok(tracks) => {
                let ids = state.catalog.merge(tracks);
                let current = state.current;
                state.queue.replace(ids, current);
                debug!(
                    count = state.queue.len(),
                    genre = ?query.genre,
                    "Track list refreshed"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch track list, keeping previous list");
                let error = PlaybackError::from(e);
                state.record(&error);
                Err(error)
            }
        }
    }

    async fn fetch_all(&self, query: &TrackQuery) -> lyra_core::Result<Vec<Track>> {
        let mut tracks = Vec::new();
        for page in 1..=MAX_LIST_PAGES {
            let batch = self
                .repository
                .fetch_list(&query.clone().with_page(page, LIST_PAGE_SIZE))
                .await?;
            let last = batch.len() < LIST_PAGE_SIZE as usize;
            tracks.extend(batch);
            if last {
                return Ok(tracks);
            }
        }
        warn!(pages = MAX_LIST_PAGES, "Track listing truncated");
        Ok(tracks)
    }

    /// Filter the list by genre. `None` or `"All"` lists every genre.
    pub async fn set_genre(&self, genre: Option<String>) -> Result<()> {
        {
            let mut state = self.inner.lock().await;
            state.query = std::mem::take(&mut state.query).with_genre(genre);
        }
        self.refresh_list().await
    }

    /// Filter the list by artist. Blank names clear the filter.
    pub async fn set_artist(&self, artist: Option<String>) -> Result<()> {
        {
            let mut state = self.inner.lock().await;
            state.query = std::mem::take(&mut state.query).with_artist(artist);
        }
        self.refresh_list().await
    }

    /// Filter the list by search text. Blank text clears the filter.
    pub async fn set_search(&self, search: Option<String>) -> Result<()> {
        {
            let mut state = self.inner.lock().await;
            state.query = std::mem::take(&mut state.query).with_search(search);
        }
        self.refresh_list().await
    }

    // ===== Track Selection =====

    /// Make `id` the current track.
    ///
    /// Clears a prior error state, so this is also how auto-advance resumes
    /// after a transport failure.
    pub async fn select_track(&self, id: TrackId) -> Result<()> {
        {
            let mut state = self.inner.lock().await;
            state.last_error = None;
            self.change_track(&mut state, id).await?;
        }
        self.refresh_detail(id).await;
        Ok(())
    }

    /// List-view selection: the current track toggles play/pause, any other
    /// track becomes current and starts playing.
    pub async fn play_from_list(&self, id: TrackId) -> Result<()> {
        {
            let mut state = self.inner.lock().await;
            if state.current == Some(id) {
                return self.toggle_locked(&mut state).await;
            }
            state.last_error = None;
            state.intent_playing = true;
            self.change_track(&mut state, id).await?;
        }
        self.refresh_detail(id).await;
        Ok(())
    }

    /// Advance to the next track of the queue
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&self) -> Result<Option<TrackId>> {
        let next = {
            let mut state = self.inner.lock().await;
            let state = &mut *state;
            let Some(next) = navigator::next(&state.queue, state.shuffle, &mut state.rng) else {
                return Ok(None);
            };
            self.change_track(state, next).await?;
            next
        };
        self.refresh_detail(next).await;
        Ok(Some(next))
    }

    /// Go back to the previous track of the queue
    pub async fn prev(&self) -> Result<Option<TrackId>> {
        let prev = {
            let mut state = self.inner.lock().await;
            let state = &mut *state;
            let Some(prev) = navigator::prev(&state.queue, state.shuffle, &mut state.rng) else {
                return Ok(None);
            };
            self.change_track(state, prev).await?;
            prev
        };
        self.refresh_detail(prev).await;
        Ok(Some(prev))
    }

    /// Persist, rebind, and resume if playback was requested
    async fn change_track(&self, state: &mut State, id: TrackId) -> Result<()> {
        let Some(resource) = state.catalog.get(id).map(|t| t.audio_path.clone()) else {
            return Err(PlaybackError::UnknownTrack(id));
        };

        state.current = Some(id);
        state.queue.set_current(id);

        if let Err(e) = session::set_current_track_id(self.store.as_ref(), id).await {
            warn!(track_id = %id, error = %e, "Failed to persist current track");
        }

        info!(track_id = %id, "Track changed");
        self.bind(state, &resource).await
    }

    async fn bind(&self, state: &mut State, resource: &str) -> Result<()> {
        if let Err(e) = state.transport.load(resource).await {
            state.playback = PlaybackState::Error;
            state.intent_playing = false;
            state.record(&e);
            return Err(e);
        }

        state.playback = PlaybackState::Loading;
        if state.intent_playing {
            self.start(state).await?;
        }
        Ok(())
    }

    /// Fetch the detail record of `id` and commit it if `id` is still current
    async fn refresh_detail(&self, id: TrackId) {
        let result = self.repository.fetch_detail(id).await;

        let mut state = self.inner.lock().await;
        if state.current != Some(id) {
            debug!(track_id = %id, current = ?state.current, "Discarding stale track detail");
            return;
        }

        match result {
            Ok(track) => {
                self.sync.observe(&track);
                state.catalog.upsert(track);
            }
            Err(e) => {
                warn!(track_id = %id, error = %e, "Failed to refresh track detail");
                state.record(&e.into());
            }
        }
    }

    // ===== Playback Control =====

    /// Flip the play/pause intent
    pub async fn toggle_play_pause(&self) -> Result<()> {
        let mut state = self.inner.lock().await;
        self.toggle_locked(&mut state).await
    }

    async fn toggle_locked(&self, state: &mut State) -> Result<()> {
        if state.intent_playing {
            Self::pause_locked(state).await;
            Ok(())
        } else {
            self.play_locked(state).await
        }
    }

    pub async fn play(&self) -> Result<()> {
        let mut state = self.inner.lock().await;
        self.play_locked(&mut state).await
    }

    async fn play_locked(&self, state: &mut State) -> Result<()> {
        let Some(current) = state.current else {
            return Err(PlaybackError::NoTrackSelected);
        };

        state.intent_playing = true;
        if state.transport.resource().is_none() {
            // Previous bind failed; try the resource again.
            let Some(resource) = state.catalog.get(current).map(|t| t.audio_path.clone()) else {
                return Err(PlaybackError::UnknownTrack(current));
            };
            state.last_error = None;
            return self.bind(state, &resource).await;
        }

        if state.playback == PlaybackState::Ended {
            state.transport.seek(0.0).await;
        }
        self.start(state).await
    }

    /// Issue the transport play; a rejection reverts to `Paused`
    async fn start(&self, state: &mut State) -> Result<()> {
        state.intent_playing = true;
        match state.transport.play().await {
            Ok(()) => {
                state.playback = PlaybackState::Playing;
                Ok(())
            }
            Err(e) => {
                warn!(track_id = ?state.current, error = %e, "Play request rejected");
                state.intent_playing = false;
                state.playback = PlaybackState::Paused;
                state.record(&e);
                Err(e)
            }
        }
    }

    pub async fn pause(&self) {
        let mut state = self.inner.lock().await;
        Self::pause_locked(&mut state).await;
    }

    async fn pause_locked(state: &mut State) {
        state.intent_playing = false;
        state.transport.pause().await;
        if matches!(state.playback, PlaybackState::Playing | PlaybackState::Loading) {
            state.playback = PlaybackState::Paused;
        }
    }

    /// Seek within the current track. Returns the applied position.
    pub async fn seek(&self, position_secs: f64) -> f64 {
        self.inner.lock().await.transport.seek(position_secs).await
    }

    /// Set volume (0.0-1.0). Returns the applied level.
    pub async fn set_volume(&self, volume: f32) -> f32 {
        self.inner.lock().await.transport.set_volume(volume).await
    }

    /// Toggle track-level repeat. Returns the new flag.
    pub async fn toggle_repeat(&self) -> bool {
        let mut state = self.inner.lock().await;
        state.repeat = !state.repeat;
        state.repeat
    }

    /// Toggle shuffle. Returns the new flag.
    pub async fn toggle_shuffle(&self) -> bool {
        let mut state = self.inner.lock().await;
        state.shuffle = !state.shuffle;
        state.shuffle
    }

    // ===== Transport Events =====

    /// Handle every event already delivered by the transport.
    ///
    /// Returns the accepted events in arrival order.
    pub async fn process_pending_events(&self) -> Vec<MediaEvent> {
        let pending: Vec<TransportEvent> = {
            let mut events = self.events.lock().await;
            std::iter::from_fn(|| events.try_recv().ok()).collect()
        };

        let mut accepted = Vec::new();
        for event in pending {
            if let Some(event) = self.handle_event(event).await {
                accepted.push(event);
            }
        }
        accepted
    }

    /// Wait for the next event from the current resource and handle it
    pub async fn wait_event(&self) -> Option<MediaEvent> {
        loop {
            let event = self.events.lock().await.recv().await?;
            if let Some(event) = self.handle_event(event).await {
                return Some(event);
            }
        }
    }

    async fn handle_event(&self, event: TransportEvent) -> Option<MediaEvent> {
        let mut state = self.inner.lock().await;
        let event = state.transport.accept(event)?;

        let advanced = match &event {
            MediaEvent::MetadataReady { duration_secs } => {
                debug!(track_id = ?state.current, duration_secs, "Metadata ready");
                if state.playback == PlaybackState::Loading {
                    state.playback = PlaybackState::Paused;
                }
                None
            }
            MediaEvent::TimeUpdate { .. } => None,
            MediaEvent::Ended => self.on_ended(&mut state).await,
            MediaEvent::Failed { message } => {
                warn!(track_id = ?state.current, error = %message, "Media resource failed");
                state.playback = PlaybackState::Error;
                state.intent_playing = false;
                state.record(&PlaybackError::Transport(message.clone()));
                None
            }
        };
        drop(state);

        if let Some(id) = advanced {
            self.refresh_detail(id).await;
        }
        Some(event)
    }

    /// Repeat, advance, or stop. Returns the track advanced to.
    async fn on_ended(&self, state: &mut State) -> Option<TrackId> {
        if state.playback == PlaybackState::Error {
            debug!("Ignoring end of resource after a transport failure");
            return None;
        }

        if state.repeat {
            debug!(track_id = ?state.current, "Repeating track");
            state.transport.seek(0.0).await;
            // Rejection is recorded by start
            let _ = self.start(state).await;
            return None;
        }

        let Some(next) = navigator::next(&state.queue, state.shuffle, &mut state.rng) else {
            state.playback = PlaybackState::Ended;
            state.intent_playing = false;
            return None;
        };

        debug!(from = ?state.current, to = %next, shuffle = state.shuffle, "Auto-advancing");
        state.intent_playing = true;
        match self.change_track(state, next).await {
            Ok(()) => Some(next),
            Err(e) => {
                debug!(track_id = %next, error = %e, "Auto-advance failed");
                None
            }
        }
    }

    // ===== Preferences =====

    pub async fn toggle_favorite(&self, id: TrackId) -> Result<PreferenceState> {
        self.toggle_preference(id, PreferenceKind::Favorite).await
    }

    pub async fn toggle_dislike(&self, id: TrackId) -> Result<PreferenceState> {
        self.toggle_preference(id, PreferenceKind::Dislike).await
    }

    async fn toggle_preference(&self, id: TrackId, kind: PreferenceKind) -> Result<PreferenceState> {
        match self.sync.toggle(id, kind).await {
            Ok(state) => Ok(state),
            Err(e) => {
                let error = PlaybackError::from(e);
                self.inner.lock().await.record(&error);
                Err(error)
            }
        }
    }

    /// Catalog tracks currently favorited, in catalog order
    pub async fn favorites(&self) -> Vec<Track> {
        self.marked(PreferenceKind::Favorite).await
    }

    /// Catalog tracks currently disliked, in catalog order
    pub async fn dislikes(&self) -> Vec<Track> {
        self.marked(PreferenceKind::Dislike).await
    }

    async fn marked(&self, kind: PreferenceKind) -> Vec<Track> {
        // Remote mode only knows tracks whose detail was read
        let ids: Vec<TrackId> = self.inner.lock().await.catalog.iter().map(|t| t.id).collect();
        self.sync.resolve(&ids).await;

        let state = self.inner.lock().await;
        state
            .catalog
            .iter()
            .filter(|t| self.sync.state(t.id).has(kind))
            .map(|t| self.overlaid(t))
            .collect()
    }

    pub fn preference_mode(&self) -> PreferenceMode {
        self.sync.mode()
    }

    /// Register for `favoritesUpdated` / `dislikesUpdated`
    pub fn subscribe(&self) -> Subscription {
        self.sync.subscribe()
    }

    // ===== State Queries =====

    /// Tracks of the queue, in list order
    pub async fn tracks(&self) -> Vec<Track> {
        let state = self.inner.lock().await;
        state
            .queue
            .ids()
            .iter()
            .filter_map(|id| state.catalog.get(*id))
            .map(|t| self.overlaid(t))
            .collect()
    }

    pub async fn current_track(&self) -> Option<Track> {
        let state = self.inner.lock().await;
        state
            .current
            .and_then(|id| state.catalog.get(id))
            .map(|t| self.overlaid(t))
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.inner.lock().await;
        PlaybackSnapshot {
            current: state
                .current
                .and_then(|id| state.catalog.get(id))
                .map(|t| self.overlaid(t)),
            state: state.playback,
            wants_playing: state.intent_playing,
            position_secs: state.transport.position_secs(),
            duration_secs: state.transport.duration_secs(),
            volume: state.transport.volume(),
            repeat: state.repeat,
            shuffle: state.shuffle,
            genre: state.query.genre.clone(),
            artist: state.query.artist.clone(),
            search: state.query.search.clone(),
            preference_mode: self.sync.mode(),
            last_error: state.last_error.clone(),
        }
    }

    fn overlaid(&self, track: &Track) -> Track {
        let mut track = track.clone();
        self.sync.overlay(&mut track);
        track
    }
}
