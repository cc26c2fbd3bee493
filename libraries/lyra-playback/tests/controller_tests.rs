//! Playback controller scenarios against a scripted backend and an in-memory
//! repository

use async_trait::async_trait;
use lyra_core::{
    ErrorKind, LyraError, PreferenceService, PreferenceState, Role, Session, SessionStore, Track,
    TrackId, TrackQuery, TrackRepository, TrackStats,
};
use lyra_playback::{
    MediaBackend, MediaEvent, MediaEventSink, PlaybackConfig, PlaybackController, PlaybackError,
    PlaybackState,
};
use lyra_storage::{session, MemorySessionStore};
use lyra_sync::{Notification, PreferenceMode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

const ONE: TrackId = TrackId::new(1);
const TWO: TrackId = TrackId::new(2);
const THREE: TrackId = TrackId::new(3);

// =============================================================================
// Test doubles
// =============================================================================

/// Shared view of what the backend was asked to do
#[derive(Default)]
struct Script {
    calls: Mutex<Vec<String>>,
    sink: Mutex<Option<MediaEventSink>>,
    reject_play: AtomicBool,
}

impl Script {
    fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    /// Calls other than volume changes
    fn transport_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !c.starts_with("volume"))
            .cloned()
            .collect()
    }

    fn emit(&self, event: MediaEvent) {
        let sink = self.sink.lock().unwrap().clone().expect("nothing loaded");
        assert!(sink.emit(event));
    }
}

struct ScriptedBackend(Arc<Script>);

#[async_trait]
impl MediaBackend for ScriptedBackend {
    async fn load(&mut self, resource: &str, events: MediaEventSink) -> lyra_playback::Result<()> {
        self.0.push(format!("load {resource}"));
        if resource.is_empty() {
            return Err(PlaybackError::Transport("cannot decode".into()));
        }
        events.emit(MediaEvent::MetadataReady {
            duration_secs: 180.0,
        });
        *self.0.sink.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn play(&mut self) -> lyra_playback::Result<()> {
        self.0.push("play");
        if self.0.reject_play.load(Ordering::SeqCst) {
            return Err(PlaybackError::Transport("play() rejected".into()));
        }
        Ok(())
    }

    async fn pause(&mut self) {
        self.0.push("pause");
    }

    async fn stop(&mut self) {
        self.0.push("stop");
    }

    async fn seek(&mut self, position_secs: f64) {
        self.0.push(format!("seek {position_secs}"));
    }

    async fn set_volume(&mut self, volume: f32) {
        self.0.push(format!("volume {volume}"));
    }
}

struct Gate {
    id: TrackId,
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[derive(Default)]
struct FakeRepository {
    tracks: Mutex<Vec<Track>>,
    fail_list: AtomicBool,
    list_calls: AtomicUsize,
    credentials: Mutex<Vec<Option<String>>>,
    gate: Mutex<Option<Gate>>,
}

impl FakeRepository {
    fn with_tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks: Mutex::new(tracks),
            ..Self::default()
        }
    }

    /// Hold detail requests for `id` until `release` is notified
    fn gate(&self, id: TrackId) -> (Arc<Notify>, Arc<Notify>) {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Gate {
            id,
            started: started.clone(),
            release: release.clone(),
        });
        (started, release)
    }

    fn set_preference(&self, id: TrackId, preference: PreferenceState) {
        let mut tracks = self.tracks.lock().unwrap();
        if let Some(track) = tracks.iter_mut().find(|t| t.id == id) {
            track.preference = preference;
        }
    }
}

#[async_trait]
impl TrackRepository for FakeRepository {
    async fn fetch_list(&self, query: &TrackQuery) -> lyra_core::Result<Vec<Track>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(LyraError::network("connection reset"));
        }

        let page = query.page.unwrap_or(1) as usize;
        let size = query.size.unwrap_or(20) as usize;
        let tracks = self.tracks.lock().unwrap();
        Ok(tracks
            .iter()
            .filter(|t| query.genre.is_none() || t.genre == query.genre)
            .filter(|t| {
                query
                    .artist
                    .as_ref()
                    .map_or(true, |artist| t.artist.contains(artist.as_str()))
            })
            .skip((page - 1) * size)
            .take(size)
            .map(|t| Track {
                preference: PreferenceState::Unmarked,
                ..t.clone()
            })
            .collect())
    }

    async fn fetch_detail(&self, id: TrackId) -> lyra_core::Result<Track> {
        let gate = self
            .gate
            .lock()
            .unwrap()
            .as_ref()
            .filter(|g| g.id == id)
            .map(|g| (g.started.clone(), g.release.clone()));
        if let Some((started, release)) = gate {
            started.notify_one();
            release.notified().await;
        }

        let tracks = self.tracks.lock().unwrap();
        let track = tracks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| LyraError::not_found("Track", id.to_string()))?;

        Ok(Track {
            title: format!("{} (detail)", track.title),
            stats: Some(TrackStats {
                favorites_count: 3,
                dislikes_count: 0,
                reviews_count: 1,
            }),
            ..track.clone()
        })
    }

    async fn set_credential(&self, token: Option<String>) {
        self.credentials.lock().unwrap().push(token);
    }
}

#[derive(Default)]
struct RecordingService {
    calls: Mutex<Vec<String>>,
}

impl RecordingService {
    fn record(&self, call: &str, id: TrackId) -> lyra_core::Result<()> {
        self.calls.lock().unwrap().push(format!("{call} {id}"));
        Ok(())
    }
}

#[async_trait]
impl PreferenceService for RecordingService {
    async fn add_favorite(&self, id: TrackId) -> lyra_core::Result<()> {
        self.record("add_favorite", id)
    }

    async fn remove_favorite(&self, id: TrackId) -> lyra_core::Result<()> {
        self.record("remove_favorite", id)
    }

    async fn add_dislike(&self, id: TrackId) -> lyra_core::Result<()> {
        self.record("add_dislike", id)
    }

    async fn remove_dislike(&self, id: TrackId) -> lyra_core::Result<()> {
        self.record("remove_dislike", id)
    }
}

// =============================================================================
// Harness
// =============================================================================

fn track(id: i64, title: &str, genre: &str) -> Track {
    let mut track = Track::new(TrackId::new(id), title, format!("/media/tracks/{id}.mp3"));
    track.artist = "Lyra Trio".to_string();
    track.genre = Some(genre.to_string());
    track
}

fn catalog() -> Vec<Track> {
    vec![
        track(1, "One", "Rock"),
        track(2, "Two", "Jazz"),
        track(3, "Three", "Rock"),
    ]
}

struct Harness {
    controller: Arc<PlaybackController>,
    repo: Arc<FakeRepository>,
    script: Arc<Script>,
    store: MemorySessionStore,
}

struct Setup {
    config: PlaybackConfig,
    tracks: Vec<Track>,
    service: Option<Arc<dyn PreferenceService>>,
    session: Option<Session>,
    store: MemorySessionStore,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            config: PlaybackConfig::default(),
            tracks: catalog(),
            service: None,
            session: None,
            store: MemorySessionStore::new(),
        }
    }
}

impl Setup {
    async fn start(self) -> Harness {
        let h = self.build();
        h.controller.initialize().await;
        h
    }

    /// Controller that has not been initialized yet
    fn build(self) -> Harness {
        let repo = Arc::new(FakeRepository::with_tracks(self.tracks));
        let script = Arc::new(Script::default());
        let controller = PlaybackController::new(
            self.config,
            repo.clone(),
            self.service,
            Arc::new(self.store.clone()),
            Box::new(ScriptedBackend(script.clone())),
        )
        .with_session(self.session)
        .with_rng(StdRng::seed_from_u64(7));

        Harness {
            controller: Arc::new(controller),
            repo,
            script,
            store: self.store,
        }
    }
}

async fn started() -> Harness {
    Setup::default().start().await
}

fn ids(tracks: &[Track]) -> Vec<TrackId> {
    tracks.iter().map(|t| t.id).collect()
}

// =============================================================================
// Startup
// =============================================================================

mod startup {
    use super::*;

    #[tokio::test]
    async fn selects_first_track_without_playing() {
        let h = started().await;

        let snapshot = h.controller.snapshot().await;
        let current = snapshot.current.expect("current track");
        assert_eq!(current.id, ONE);
        assert_eq!(current.title, "One (detail)");
        assert_eq!(snapshot.state, PlaybackState::Loading);
        assert!(!snapshot.wants_playing);
        assert_eq!(h.script.transport_calls(), vec!["load /media/tracks/1.mp3"]);
        assert!(h.script.calls.lock().unwrap().contains(&"volume 0.8".to_string()));

        let events = h.controller.process_pending_events().await;
        assert_eq!(
            events,
            vec![MediaEvent::MetadataReady {
                duration_secs: 180.0
            }]
        );

        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.state, PlaybackState::Paused);
        assert_eq!(snapshot.duration_secs, Some(180.0));
        assert_eq!(session::current_track_id(&h.store).await.unwrap(), Some(ONE));
    }

    #[tokio::test]
    async fn restores_persisted_track() {
        let store = MemorySessionStore::new();
        session::set_current_track_id(&store, THREE).await.unwrap();

        let h = Setup {
            store,
            ..Setup::default()
        }
        .start()
        .await;

        let current = h.controller.current_track().await.unwrap();
        assert_eq!(current.id, THREE);
        assert_eq!(current.title, "Three (detail)");
        assert_eq!(h.script.transport_calls(), vec!["load /media/tracks/3.mp3"]);
    }

    #[tokio::test]
    async fn falls_back_when_persisted_track_is_gone() {
        let store = MemorySessionStore::new();
        session::set_current_track_id(&store, TrackId::new(99)).await.unwrap();

        let h = Setup {
            store,
            ..Setup::default()
        }
        .start()
        .await;

        assert_eq!(h.controller.current_track().await.unwrap().id, ONE);
        assert_eq!(session::current_track_id(&h.store).await.unwrap(), Some(ONE));
    }

    #[tokio::test]
    async fn selection_during_startup_wins_over_restored_track() {
        let store = MemorySessionStore::new();
        session::set_current_track_id(&store, THREE).await.unwrap();
        let h = Setup {
            store,
            ..Setup::default()
        }
        .build();
        let (fetch_started, release) = h.repo.gate(THREE);

        let startup = tokio::spawn({
            let controller = h.controller.clone();
            async move { controller.initialize().await }
        });
        fetch_started.notified().await;

        h.controller.select_track(TWO).await.unwrap();
        release.notify_one();
        startup.await.unwrap();

        let current = h.controller.current_track().await.unwrap();
        assert_eq!(current.id, TWO);
        assert_eq!(current.title, "Two (detail)");
        assert_eq!(session::current_track_id(&h.store).await.unwrap(), Some(TWO));
        assert_eq!(h.script.transport_calls(), vec!["load /media/tracks/2.mp3"]);
    }

    #[tokio::test]
    async fn empty_list_stays_idle() {
        let h = Setup {
            tracks: vec![],
            ..Setup::default()
        }
        .start()
        .await;

        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.state, PlaybackState::Idle);
        assert!(snapshot.current.is_none());
        assert!(h.script.transport_calls().is_empty());

        let err = h.controller.play().await.unwrap_err();
        assert!(matches!(err, PlaybackError::NoTrackSelected));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

// =============================================================================
// Track changes
// =============================================================================

mod track_change {
    use super::*;

    #[tokio::test]
    async fn persists_and_rebinds_once() {
        let h = started().await;

        h.controller.select_track(THREE).await.unwrap();

        assert_eq!(
            h.script.transport_calls(),
            vec![
                "load /media/tracks/1.mp3",
                "stop",
                "load /media/tracks/3.mp3"
            ]
        );
        assert_eq!(session::current_track_id(&h.store).await.unwrap(), Some(THREE));
    }

    #[tokio::test]
    async fn playback_resumes_on_next() {
        let h = started().await;
        h.controller.play().await.unwrap();

        assert_eq!(h.controller.next().await.unwrap(), Some(TWO));

        assert_eq!(h.controller.snapshot().await.state, PlaybackState::Playing);
        assert_eq!(
            h.script.transport_calls(),
            vec![
                "load /media/tracks/1.mp3",
                "play",
                "stop",
                "load /media/tracks/2.mp3",
                "play"
            ]
        );
    }

    #[tokio::test]
    async fn paused_stays_paused_on_prev() {
        let h = started().await;

        assert_eq!(h.controller.prev().await.unwrap(), Some(THREE));

        assert!(!h.controller.snapshot().await.wants_playing);
        assert!(!h.script.transport_calls().contains(&"play".to_string()));
    }

    #[tokio::test]
    async fn unknown_track_is_rejected() {
        let h = started().await;

        let err = h.controller.select_track(TrackId::new(42)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(h.controller.current_track().await.unwrap().id, ONE);
    }

    #[tokio::test]
    async fn stale_detail_does_not_overwrite_current_track() {
        let h = started().await;
        let (fetch_started, release) = h.repo.gate(THREE);

        let task = tokio::spawn({
            let controller = h.controller.clone();
            async move { controller.select_track(THREE).await }
        });
        fetch_started.notified().await;

        h.controller.select_track(TWO).await.unwrap();
        release.notify_one();
        task.await.unwrap().unwrap();

        let current = h.controller.current_track().await.unwrap();
        assert_eq!(current.id, TWO);
        assert_eq!(current.title, "Two (detail)");

        let tracks = h.controller.tracks().await;
        let three = tracks.iter().find(|t| t.id == THREE).unwrap();
        assert_eq!(three.title, "Three");
    }

    #[tokio::test]
    async fn play_from_list_toggles_current_and_starts_others() {
        let h = started().await;

        h.controller.play_from_list(ONE).await.unwrap();
        assert_eq!(h.controller.snapshot().await.state, PlaybackState::Playing);

        h.controller.play_from_list(ONE).await.unwrap();
        assert_eq!(h.controller.snapshot().await.state, PlaybackState::Paused);

        h.controller.play_from_list(THREE).await.unwrap();
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.current.unwrap().id, THREE);
        assert_eq!(snapshot.state, PlaybackState::Playing);
    }
}

// =============================================================================
// Transport events and failures
// =============================================================================

mod transport {
    use super::*;

    #[tokio::test]
    async fn play_rejection_reverts_to_paused() {
        let h = started().await;
        h.script.reject_play.store(true, Ordering::SeqCst);

        let err = h.controller.play().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.state, PlaybackState::Paused);
        assert!(!snapshot.wants_playing);
        assert_eq!(
            snapshot.last_error.map(|e| e.kind),
            Some(ErrorKind::TransportFailure)
        );
    }

    #[tokio::test]
    async fn ended_advances_to_next_track() {
        let h = started().await;
        h.controller.play().await.unwrap();

        h.script.emit(MediaEvent::Ended);
        let events = h.controller.process_pending_events().await;

        assert!(events.contains(&MediaEvent::Ended));
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.current.unwrap().id, TWO);
        assert_eq!(snapshot.state, PlaybackState::Playing);
        assert_eq!(session::current_track_id(&h.store).await.unwrap(), Some(TWO));
    }

    #[tokio::test]
    async fn ended_with_repeat_restarts_track() {
        let h = started().await;
        h.controller.play().await.unwrap();
        assert!(h.controller.toggle_repeat().await);

        h.script.emit(MediaEvent::Ended);
        h.controller.process_pending_events().await;

        let calls = h.script.transport_calls();
        assert_eq!(&calls[calls.len() - 2..], ["seek 0", "play"]);
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.current.unwrap().id, ONE);
        assert_eq!(snapshot.state, PlaybackState::Playing);
    }

    #[tokio::test]
    async fn ended_with_empty_queue_stops() {
        let h = started().await;
        h.controller.set_genre(Some("Blues".into())).await.unwrap();
        h.controller.play().await.unwrap();

        h.script.emit(MediaEvent::Ended);
        h.controller.process_pending_events().await;

        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.state, PlaybackState::Ended);
        assert!(!snapshot.wants_playing);
        assert_eq!(snapshot.current.unwrap().id, ONE);
    }

    #[tokio::test]
    async fn failure_halts_auto_advance_until_selection() {
        let h = started().await;
        h.controller.play().await.unwrap();

        h.script.emit(MediaEvent::Failed {
            message: "decode error".into(),
        });
        h.script.emit(MediaEvent::Ended);
        h.controller.process_pending_events().await;

        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.state, PlaybackState::Error);
        assert_eq!(snapshot.current.unwrap().id, ONE);
        assert_eq!(
            snapshot.last_error.map(|e| e.kind),
            Some(ErrorKind::TransportFailure)
        );

        h.controller.select_track(TWO).await.unwrap();
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.state, PlaybackState::Loading);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn load_failure_sets_error_state() {
        let mut tracks = catalog();
        tracks[1].audio_path = String::new();
        let h = Setup {
            tracks,
            ..Setup::default()
        }
        .start()
        .await;

        let err = h.controller.select_track(TWO).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.state, PlaybackState::Error);
        assert!(!snapshot.wants_playing);

        h.controller.select_track(THREE).await.unwrap();
        assert_eq!(h.controller.snapshot().await.state, PlaybackState::Loading);
    }

    #[tokio::test]
    async fn events_from_replaced_resource_are_ignored() {
        let h = started().await;
        let old_sink = h.script.sink.lock().unwrap().clone().unwrap();
        h.controller.select_track(TWO).await.unwrap();
        h.controller.process_pending_events().await;

        old_sink.emit(MediaEvent::Ended);
        let events = h.controller.process_pending_events().await;

        assert!(events.is_empty());
        assert_eq!(h.controller.current_track().await.unwrap().id, TWO);
    }

    #[tokio::test]
    async fn volume_and_seek_are_clamped() {
        let h = started().await;
        h.controller.process_pending_events().await;

        assert!((h.controller.set_volume(1.5).await - 1.0).abs() < f32::EPSILON);
        assert!((h.controller.seek(500.0).await - 180.0).abs() < f64::EPSILON);
        assert!((h.controller.snapshot().await.volume - 1.0).abs() < f32::EPSILON);
    }
}

// =============================================================================
// Track list
// =============================================================================

mod list {
    use super::*;

    #[tokio::test]
    async fn genre_filter_keeps_current_track() {
        let h = started().await;

        h.controller.set_genre(Some("Jazz".into())).await.unwrap();

        assert_eq!(ids(&h.controller.tracks().await), vec![TWO]);
        assert_eq!(h.controller.current_track().await.unwrap().id, ONE);
        assert_eq!(h.controller.next().await.unwrap(), Some(TWO));

        h.controller.set_genre(Some("All".into())).await.unwrap();
        assert_eq!(ids(&h.controller.tracks().await), vec![ONE, TWO, THREE]);
        assert_eq!(h.controller.snapshot().await.genre, None);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let h = started().await;
        h.repo.fail_list.store(true, Ordering::SeqCst);

        let err = h.controller.set_genre(Some("Jazz".into())).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert_eq!(ids(&h.controller.tracks().await), vec![ONE, TWO, THREE]);
        let snapshot = h.controller.snapshot().await;
        assert_eq!(
            snapshot.last_error.map(|e| e.kind),
            Some(ErrorKind::NetworkFailure)
        );
        assert_eq!(snapshot.genre.as_deref(), Some("Jazz"));
    }

    #[tokio::test]
    async fn every_page_is_queued() {
        let tracks: Vec<Track> = (1..=150).map(|id| track(id, "Song", "Rock")).collect();
        let h = Setup {
            tracks,
            ..Setup::default()
        }
        .start()
        .await;

        let queued = h.controller.tracks().await;
        assert_eq!(queued.len(), 150);
        assert_eq!(queued.last().unwrap().id, TrackId::new(150));
        assert_eq!(h.repo.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn artist_filter_narrows_queue() {
        let mut tracks = catalog();
        tracks[2].artist = "Nina Simone".to_string();
        let h = Setup {
            tracks,
            ..Setup::default()
        }
        .start()
        .await;

        h.controller.set_artist(Some("Nina".into())).await.unwrap();

        assert_eq!(ids(&h.controller.tracks().await), vec![THREE]);
        assert_eq!(h.controller.snapshot().await.artist.as_deref(), Some("Nina"));
    }

    #[tokio::test]
    async fn search_is_reported_in_snapshot() {
        let h = started().await;

        h.controller.set_search(Some("one".into())).await.unwrap();
        assert_eq!(h.controller.snapshot().await.search.as_deref(), Some("one"));

        h.controller.set_search(Some("  ".into())).await.unwrap();
        assert_eq!(h.controller.snapshot().await.search, None);
    }
}

// =============================================================================
// Preferences and sessions
// =============================================================================

mod preferences {
    use super::*;

    #[tokio::test]
    async fn local_lists_follow_toggles() {
        let h = started().await;
        assert_eq!(h.controller.preference_mode(), PreferenceMode::Local);
        let mut observer = h.controller.subscribe();

        h.controller.toggle_favorite(TWO).await.unwrap();
        h.controller.toggle_dislike(THREE).await.unwrap();
        assert_eq!(ids(&h.controller.favorites().await), vec![TWO]);
        assert_eq!(ids(&h.controller.dislikes().await), vec![THREE]);

        let state = h.controller.toggle_dislike(TWO).await.unwrap();
        assert_eq!(state, PreferenceState::Disliked);
        assert!(h.controller.favorites().await.is_empty());
        assert_eq!(ids(&h.controller.dislikes().await), vec![TWO, THREE]);

        assert_eq!(
            observer.drain(),
            vec![
                Notification::FavoritesUpdated,
                Notification::DislikesUpdated,
                Notification::FavoritesUpdated,
                Notification::DislikesUpdated,
            ]
        );
        assert_eq!(
            session::id_list(&h.store, session::KEY_DISLIKES).await.unwrap(),
            vec![THREE, TWO]
        );
    }

    #[tokio::test]
    async fn current_track_shows_preference() {
        let h = started().await;

        h.controller.toggle_favorite(ONE).await.unwrap();

        let snapshot = h.controller.snapshot().await;
        assert!(snapshot.current.unwrap().is_favorite());
    }

    #[tokio::test]
    async fn disabled_mode_requires_session() {
        let store = MemorySessionStore::new();
        let h = Setup {
            config: PlaybackConfig {
                allow_anonymous_preferences: false,
                ..PlaybackConfig::default()
            },
            store,
            ..Setup::default()
        }
        .start()
        .await;
        let mut observer = h.controller.subscribe();

        let err = h.controller.toggle_favorite(ONE).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AuthRequired);
        assert_eq!(h.controller.preference_mode(), PreferenceMode::Disabled);
        assert!(observer.drain().is_empty());
        assert_eq!(h.store.get(session::KEY_FAVORITES).await.unwrap(), None);
        assert_eq!(
            h.controller.snapshot().await.last_error.map(|e| e.kind),
            Some(ErrorKind::AuthRequired)
        );
    }

    #[tokio::test]
    async fn remote_mode_is_seeded_from_detail() {
        let service = Arc::new(RecordingService::default());
        let mut tracks = catalog();
        tracks[0].preference = PreferenceState::Disliked;

        let h = Setup {
            tracks,
            service: Some(service.clone()),
            session: Some(Session::new("token-1", Role::User)),
            ..Setup::default()
        }
        .start()
        .await;

        assert_eq!(h.controller.preference_mode(), PreferenceMode::Remote);
        assert_eq!(ids(&h.controller.dislikes().await), vec![ONE]);

        let state = h.controller.toggle_favorite(ONE).await.unwrap();

        assert_eq!(state, PreferenceState::Favorited);
        assert_eq!(
            *service.calls.lock().unwrap(),
            vec!["remove_dislike 1", "add_favorite 1"]
        );
        assert_eq!(ids(&h.controller.favorites().await), vec![ONE]);
    }

    #[tokio::test]
    async fn remote_toggle_reads_unseen_track_first() {
        let service = Arc::new(RecordingService::default());
        let mut tracks = catalog();
        tracks[1].preference = PreferenceState::Favorited;

        let h = Setup {
            tracks,
            service: Some(service.clone()),
            session: Some(Session::new("token-1", Role::User)),
            ..Setup::default()
        }
        .start()
        .await;
        assert_eq!(h.controller.current_track().await.unwrap().id, ONE);

        let state = h.controller.toggle_dislike(TWO).await.unwrap();

        assert_eq!(state, PreferenceState::Disliked);
        assert_eq!(
            *service.calls.lock().unwrap(),
            vec!["remove_favorite 2", "add_dislike 2"]
        );
        assert!(h.controller.favorites().await.is_empty());
        assert_eq!(ids(&h.controller.dislikes().await), vec![TWO]);
    }

    #[tokio::test]
    async fn remote_lists_cover_tracks_never_selected() {
        let service = Arc::new(RecordingService::default());
        let mut tracks = catalog();
        tracks[2].preference = PreferenceState::Favorited;

        let h = Setup {
            tracks,
            service: Some(service.clone()),
            session: Some(Session::new("token-1", Role::User)),
            ..Setup::default()
        }
        .start()
        .await;

        assert_eq!(ids(&h.controller.favorites().await), vec![THREE]);
        assert!(h.controller.dislikes().await.is_empty());
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_remote_track_is_not_toggled() {
        let service = Arc::new(RecordingService::default());
        let h = Setup {
            service: Some(service.clone()),
            session: Some(Session::new("token-1", Role::User)),
            ..Setup::default()
        }
        .start()
        .await;
        let mut observer = h.controller.subscribe();

        let missing = TrackId::new(99);
        assert!(h.controller.toggle_favorite(missing).await.is_err());

        assert!(service.calls.lock().unwrap().is_empty());
        assert!(observer.drain().is_empty());
        assert!(h.controller.snapshot().await.last_error.is_some());
    }

    #[tokio::test]
    async fn logout_switches_to_local_lists() {
        let service = Arc::new(RecordingService::default());
        let store = MemorySessionStore::new();
        session::set_id_list(&store, session::KEY_FAVORITES, &[THREE])
            .await
            .unwrap();

        let h = Setup {
            service: Some(service),
            session: Some(Session::new("token-1", Role::User)),
            store,
            ..Setup::default()
        }
        .start()
        .await;
        h.repo.set_preference(ONE, PreferenceState::Favorited);
        h.controller.select_track(ONE).await.unwrap();
        assert_eq!(ids(&h.controller.favorites().await), vec![ONE]);
        let mut observer = h.controller.subscribe();

        h.controller.set_session(None).await.unwrap();

        assert_eq!(h.controller.preference_mode(), PreferenceMode::Local);
        assert_eq!(ids(&h.controller.favorites().await), vec![THREE]);
        assert_eq!(
            *h.repo.credentials.lock().unwrap(),
            vec![Some("token-1".to_string()), None]
        );
        assert_eq!(h.repo.list_calls.load(Ordering::SeqCst), 2);

        let seen: HashSet<Notification> = observer.drain().into_iter().collect();
        assert!(seen.contains(&Notification::FavoritesUpdated));
        assert!(seen.contains(&Notification::DislikesUpdated));
    }
}
