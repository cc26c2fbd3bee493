//! Preference Synchronizer
//!
//! Single authority for favorite/dislike state. Holds the in-memory view,
//! routes each toggle to the strategy selected by the session state, and
//! announces accepted changes on the notification bus.
//!
//! Guarantees:
//! - The in-memory view changes only after the strategy reports success.
//! - Each accepted toggle publishes once per affected kind, after the write.
//! - Toggles on the same track run one at a time, in call order.
//! - In remote mode a toggle never starts from a guessed state: a track the
//!   view has not seen yet is fetched first when a repository is attached.

use crate::bus::{Notification, NotificationBus, Subscription};
use crate::error::{Result, SyncError};
use crate::strategy::{LocalStrategy, PreferenceStrategy, RemoteStrategy};
use lyra_core::{
    PreferenceKind, PreferenceService, PreferenceState, SessionStore, Track, TrackId,
    TrackRepository,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Which backend currently owns preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceMode {
    /// Session present; the remote service is the authority
    Remote,
    /// No session; the session store lists are the authority
    Local,
    /// No session and anonymous preferences are not allowed
    Disabled,
}

struct View {
    mode: PreferenceMode,
    strategy: Option<Arc<dyn PreferenceStrategy>>,
    states: HashMap<TrackId, PreferenceState>,
    // Remote mode: ids whose server state has been read or written
    known: HashSet<TrackId>,
    // Bumped on every mode switch so in-flight toggles of the old mode are
    // not committed into the new view.
    generation: u64,
}

type KeyLock = Arc<tokio::sync::Mutex<()>>;

/// Favorite/dislike state machine with a mode-selected backend
pub struct PreferenceSynchronizer {
    bus: NotificationBus,
    store: Arc<dyn SessionStore>,
    service: Option<Arc<dyn PreferenceService>>,
    repository: Option<Arc<dyn TrackRepository>>,
    allow_anonymous: bool,
    view: RwLock<View>,
    key_locks: Mutex<HashMap<TrackId, KeyLock>>,
}

impl PreferenceSynchronizer {
    /// Create a synchronizer in `Disabled` mode.
    ///
    /// Call [`switch_mode`](Self::switch_mode) once the session state is known.
    pub fn new(
        bus: NotificationBus,
        store: Arc<dyn SessionStore>,
        service: Option<Arc<dyn PreferenceService>>,
        allow_anonymous: bool,
    ) -> Self {
        Self {
            bus,
            store,
            service,
            repository: None,
            allow_anonymous,
            view: RwLock::new(View {
                mode: PreferenceMode::Disabled,
                strategy: None,
                states: HashMap::new(),
                known: HashSet::new(),
                generation: 0,
            }),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Read unseen tracks from `repository` before toggling them in remote mode
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn TrackRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Register an observer on the bus
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn mode(&self) -> PreferenceMode {
        self.read_view().mode
    }

    /// Select the backend for the given session state and reload the view.
    ///
    /// Remote mode starts empty and is seeded through [`observe`](Self::observe);
    /// local mode loads both lists from the session store. Observers are told
    /// about both kinds since every derived list may have changed.
    pub async fn switch_mode(&self, authenticated: bool) -> Result<PreferenceMode> {
        let (mode, strategy): (PreferenceMode, Option<Arc<dyn PreferenceStrategy>>) =
            match (&self.service, authenticated) {
                (Some(service), true) => (
                    PreferenceMode::Remote,
                    Some(Arc::new(RemoteStrategy::new(Arc::clone(service)))),
                ),
                _ if self.allow_anonymous => (
                    PreferenceMode::Local,
                    Some(Arc::new(LocalStrategy::new(Arc::clone(&self.store)))),
                ),
                _ => (PreferenceMode::Disabled, None),
            };

        let states = match &strategy {
            Some(strategy) => strategy.load().await?,
            None => HashMap::new(),
        };

        {
            let mut view = self.write_view();
            view.mode = mode;
            view.strategy = strategy;
            view.generation += 1;
            view.states = states;
            view.known.clear();
            info!(?mode, marked = view.states.len(), "Preference mode switched");
        }

        self.bus.publish(Notification::FavoritesUpdated);
        self.bus.publish(Notification::DislikesUpdated);
        Ok(mode)
    }

    /// Current state of a track
    pub fn state(&self, id: TrackId) -> PreferenceState {
        self.read_view()
            .states
            .get(&id)
            .copied()
            .unwrap_or_default()
    }

    /// Ids currently marked `kind`, ascending
    pub fn marked(&self, kind: PreferenceKind) -> Vec<TrackId> {
        let view = self.read_view();
        let mut ids: Vec<TrackId> = view
            .states
            .iter()
            .filter(|(_, state)| state.has(kind))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Seed the view from a freshly fetched track record (remote mode only).
    ///
    /// Ignored while a toggle for the same track is in flight, since the
    /// record may predate it.
    pub fn observe(&self, track: &Track) {
        if self.key_busy(track.id) {
            debug!(track_id = %track.id, "Toggle in flight, ignoring fetched preference");
            return;
        }

        let generation = self.read_view().generation;
        self.seed(track, generation);
    }

    /// Fetch every id the remote view has not seen yet.
    ///
    /// No-op outside remote mode or without a repository. Ids that fail to
    /// fetch are skipped and stay unknown.
    pub async fn resolve(&self, ids: &[TrackId]) {
        for &id in ids {
            let key_lock = self.key_lock(id);
            let _guard = key_lock.lock().await;
            if let Err(e) = self.ensure_known(id).await {
                warn!(track_id = %id, error = %e, "Failed to read remote preference");
            }
        }
    }

    /// Overwrite `track.preference` with the synchronizer's view
    pub fn overlay(&self, track: &mut Track) {
        track.preference = self.state(track.id);
    }

    pub async fn toggle_favorite(&self, id: TrackId) -> Result<PreferenceState> {
        self.toggle(id, PreferenceKind::Favorite).await
    }

    pub async fn toggle_dislike(&self, id: TrackId) -> Result<PreferenceState> {
        self.toggle(id, PreferenceKind::Dislike).await
    }

    /// Toggle `kind` on a track and return the resulting state.
    ///
    /// On error the observed state is unchanged and nothing is published.
    pub async fn toggle(&self, id: TrackId, kind: PreferenceKind) -> Result<PreferenceState> {
        let key_lock = self.key_lock(id);
        let _guard = key_lock.lock().await;

        self.ensure_known(id).await?;

        let (strategy, from, generation) = {
            let view = self.read_view();
            let Some(strategy) = view.strategy.clone() else {
                warn!(track_id = %id, "Preference toggle without a session");
                return Err(SyncError::Disabled);
            };
            let from = view.states.get(&id).copied().unwrap_or_default();
            (strategy, from, view.generation)
        };
        let to = from.toggled(kind);

        if let Err(e) = strategy.apply(id, from, to).await {
            warn!(track_id = %id, ?kind, error = %e, "Preference change rejected");
            return Err(e.into());
        }

        {
            let mut view = self.write_view();
            if view.generation != generation {
                debug!(track_id = %id, "Mode switched during toggle, discarding result");
                return Ok(view.states.get(&id).copied().unwrap_or_default());
            }
            view.set(id, to);
        }

        info!(track_id = %id, ?from, ?to, "Preference changed");

        for affected in [PreferenceKind::Favorite, PreferenceKind::Dislike] {
            if from.has(affected) || to.has(affected) {
                self.bus.publish(Notification::for_kind(affected));
            }
        }

        Ok(to)
    }

    /// Read the server state of `id` if the remote view has never seen it.
    ///
    /// Caller holds the key lock of `id`.
    async fn ensure_known(&self, id: TrackId) -> Result<()> {
        let Some(repository) = &self.repository else {
            return Ok(());
        };
        let generation = {
            let view = self.read_view();
            if view.mode != PreferenceMode::Remote || view.known.contains(&id) {
                return Ok(());
            }
            view.generation
        };

        debug!(track_id = %id, "Reading remote preference before toggle");
        let track = repository.fetch_detail(id).await?;
        self.seed(&track, generation);
        Ok(())
    }

    fn seed(&self, track: &Track, generation: u64) {
        let mut view = self.write_view();
        if view.mode != PreferenceMode::Remote || view.generation != generation {
            return;
        }
        view.set(track.id, track.preference);
    }

    fn key_lock(&self, id: TrackId) -> KeyLock {
        let mut locks = self
            .key_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Drop locks nobody holds or waits on.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(id).or_default())
    }

    fn key_busy(&self, id: TrackId) -> bool {
        self.key_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .is_some_and(|lock| Arc::strong_count(lock) > 1)
    }

    fn read_view(&self) -> std::sync::RwLockReadGuard<'_, View> {
        self.view.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_view(&self) -> std::sync::RwLockWriteGuard<'_, View> {
        self.view.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl View {
    fn set(&mut self, id: TrackId, state: PreferenceState) {
        if state == PreferenceState::Unmarked {
            self.states.remove(&id);
        } else {
            self.states.insert(id, state);
        }
        if self.mode == PreferenceMode::Remote {
            self.known.insert(id);
        }
    }
}

impl std::fmt::Debug for PreferenceSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceSynchronizer")
            .field("mode", &self.mode())
            .field("allow_anonymous", &self.allow_anonymous)
            .finish_non_exhaustive()
    }
}
