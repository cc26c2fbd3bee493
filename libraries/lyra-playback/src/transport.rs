//! Playback Transport
//!
//! Wraps the single platform media handle. The controller is the only
//! caller; no other component touches the backend.

use crate::error::{PlaybackError, Result};
use crate::events::{EventStream, MediaEvent, MediaEventSink, TransportEvent};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Platform media handle
///
/// Implementors render one resource at a time and report progress through
/// the sink handed to [`load`](MediaBackend::load).
#[async_trait]
pub trait MediaBackend: Send {
    /// Bind a new resource. Metadata arrives later as an event.
    async fn load(&mut self, resource: &str, events: MediaEventSink) -> Result<()>;

    /// Start or resume rendering. May be rejected by the platform.
    async fn play(&mut self) -> Result<()>;

    async fn pause(&mut self);

    /// Stop rendering and release the bound resource
    async fn stop(&mut self);

    async fn seek(&mut self, position_secs: f64);

    async fn set_volume(&mut self, volume: f32);
}

/// Owner of the one media handle per controller
pub struct PlaybackTransport {
    backend: Box<dyn MediaBackend>,
    events: mpsc::UnboundedSender<TransportEvent>,
    load_id: u64,
    resource: Option<String>,
    duration_secs: Option<f64>,
    position_secs: f64,
    volume: f32,
}

impl PlaybackTransport {
    /// Wrap a backend. Events for the controller arrive on the returned stream.
    pub fn new(backend: Box<dyn MediaBackend>, volume: f32) -> (Self, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            backend,
            events: tx,
            load_id: 0,
            resource: None,
            duration_secs: None,
            position_secs: 0.0,
            volume: clamp_volume(volume, 0.8),
        };
        (transport, rx)
    }

    /// Apply the initial volume to the backend
    pub async fn init(&mut self) {
        self.backend.set_volume(self.volume).await;
    }

    // ===== Resource =====

    /// Bind a new resource, stopping the previous one first.
    ///
    /// On failure nothing stays bound and the error is returned to the
    /// controller to record; the call itself never panics.
    pub async fn load(&mut self, resource: &str) -> Result<()> {
        if self.resource.take().is_some() {
            self.backend.stop().await;
        }

        self.load_id += 1;
        self.duration_secs = None;
        self.position_secs = 0.0;

        let sink = MediaEventSink::new(self.load_id, self.events.clone());
        debug!(load_id = self.load_id, resource, "Binding media resource");

        match self.backend.load(resource, sink).await {
            Ok(()) => {
                self.resource = Some(resource.to_string());
                Ok(())
            }
            Err(e) => {
                warn!(resource, error = %e, "Failed to bind media resource");
                Err(e)
            }
        }
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    // ===== Playback Control =====

    pub async fn play(&mut self) -> Result<()> {
        if self.resource.is_none() {
            return Err(PlaybackError::Transport("no resource bound".into()));
        }
        self.backend.play().await
    }

    pub async fn pause(&mut self) {
        if self.resource.is_some() {
            self.backend.pause().await;
        }
    }

    /// Seek within the bound resource.
    ///
    /// Clamped to `[0, duration]` once the duration is known. Returns the
    /// applied position.
    pub async fn seek(&mut self, position_secs: f64) -> f64 {
        let mut target = if position_secs.is_finite() {
            position_secs.max(0.0)
        } else {
            0.0
        };
        if let Some(duration) = self.duration_secs {
            target = target.min(duration);
        }

        self.position_secs = target;
        if self.resource.is_some() {
            self.backend.seek(target).await;
        }
        target
    }

    // ===== Volume =====

    /// Set volume, clamped to `[0, 1]`. Returns the applied level.
    pub async fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = clamp_volume(volume, self.volume);
        self.backend.set_volume(self.volume).await;
        self.volume
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    // ===== Events =====

    /// Filter and absorb an event from the backend.
    ///
    /// Events from a replaced resource are dropped. Accepted events update
    /// the known duration/position and are handed back to the controller.
    pub fn accept(&mut self, event: TransportEvent) -> Option<MediaEvent> {
        if event.load_id != self.load_id || self.resource.is_none() {
            debug!(
                event_load = event.load_id,
                current_load = self.load_id,
                "Dropping event from replaced resource"
            );
            return None;
        }

        match &event.event {
            MediaEvent::MetadataReady { duration_secs } => {
                if duration_secs.is_finite() && *duration_secs >= 0.0 {
                    self.duration_secs = Some(*duration_secs);
                }
            }
            MediaEvent::TimeUpdate { position_secs } => {
                if position_secs.is_finite() {
                    self.position_secs = position_secs.max(0.0);
                }
            }
            MediaEvent::Ended => {
                if let Some(duration) = self.duration_secs {
                    self.position_secs = duration;
                }
            }
            MediaEvent::Failed { .. } => {}
        }

        Some(event.event)
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }
}

fn clamp_volume(volume: f32, fallback: f32) -> f32 {
    if volume.is_nan() {
        fallback
    } else {
        volume.clamp(0.0, 1.0)
    }
}
