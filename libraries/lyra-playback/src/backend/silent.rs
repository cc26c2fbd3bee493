//! Headless backend that renders silence
//!
//! Every resource "plays" for a fixed nominal duration. Useful for running
//! the controller where no audio device exists.

use crate::error::{PlaybackError, Result};
use crate::events::{MediaEvent, MediaEventSink};
use crate::transport::MediaBackend;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Media backend that plays silence for a nominal duration
pub struct SilentBackend {
    nominal: Duration,
    tick: Duration,
    sink: Option<MediaEventSink>,
    position: Arc<Mutex<f64>>,
    ticker: Option<JoinHandle<()>>,
    volume: f32,
}

impl SilentBackend {
    /// Create a backend reporting `nominal` for every resource and a
    /// time update every `tick` while playing.
    pub fn new(nominal: Duration, tick: Duration) -> Self {
        Self {
            nominal,
            tick: tick.max(Duration::from_millis(1)),
            sink: None,
            position: Arc::new(Mutex::new(0.0)),
            ticker: None,
            volume: 1.0,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn halt(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn set_position(&self, secs: f64) {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner) = secs;
    }
}

impl Default for SilentBackend {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), Duration::from_millis(250))
    }
}

impl Drop for SilentBackend {
    fn drop(&mut self) {
        self.halt();
    }
}

#[async_trait]
impl MediaBackend for SilentBackend {
    async fn load(&mut self, resource: &str, events: MediaEventSink) -> Result<()> {
        self.halt();
        if resource.trim().is_empty() {
            self.sink = None;
            return Err(PlaybackError::Transport("empty resource reference".into()));
        }

        self.set_position(0.0);
        events.emit(MediaEvent::MetadataReady {
            duration_secs: self.nominal.as_secs_f64(),
        });
        self.sink = Some(events);
        Ok(())
    }

    async fn play(&mut self) -> Result<()> {
        let Some(sink) = self.sink.clone() else {
            return Err(PlaybackError::Transport("nothing loaded".into()));
        };
        if self.ticker.as_ref().is_some_and(|t| !t.is_finished()) {
            return Ok(());
        }

        let position = Arc::clone(&self.position);
        let tick = self.tick;
        let total = self.nominal.as_secs_f64();

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await;
            loop {
                interval.tick().await;
                let now = {
                    let mut pos = position.lock().unwrap_or_else(PoisonError::into_inner);
                    *pos = (*pos + tick.as_secs_f64()).min(total);
                    *pos
                };
                if !sink.emit(MediaEvent::TimeUpdate { position_secs: now }) {
                    break;
                }
                if now >= total {
                    sink.emit(MediaEvent::Ended);
                    break;
                }
            }
        }));
        Ok(())
    }

    async fn pause(&mut self) {
        self.halt();
    }

    async fn stop(&mut self) {
        self.halt();
        self.sink = None;
        self.set_position(0.0);
    }

    async fn seek(&mut self, position_secs: f64) {
        self.set_position(position_secs.clamp(0.0, self.nominal.as_secs_f64()));
    }

    async fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}
