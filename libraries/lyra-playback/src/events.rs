//! Media Events
//!
//! Events raised by a media backend while a resource is bound:
//! - Metadata ready (duration known)
//! - Time progress (periodic)
//! - Ended (resource exhausted)
//! - Failed (decode/network error after load)
//!
//! Each event is tagged with the load it belongs to, so events from a
//! resource that has since been replaced are dropped by the transport.

use tokio::sync::mpsc;

/// Events emitted by a media backend
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration of the bound resource is known
    MetadataReady { duration_secs: f64 },

    /// Playback position update
    TimeUpdate { position_secs: f64 },

    /// Resource played to the end
    Ended,

    /// Resource failed after it was bound
    Failed { message: String },
}

/// A media event with the load it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct TransportEvent {
    pub load_id: u64,
    pub event: MediaEvent,
}

/// Receiving end of the transport event channel
pub type EventStream = mpsc::UnboundedReceiver<TransportEvent>;

/// Handle a backend uses to report events for one load
#[derive(Debug, Clone)]
pub struct MediaEventSink {
    load_id: u64,
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl MediaEventSink {
    pub(crate) fn new(load_id: u64, tx: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self { load_id, tx }
    }

    /// Send an event; returns false once the transport is gone
    pub fn emit(&self, event: MediaEvent) -> bool {
        self.tx
            .send(TransportEvent {
                load_id: self.load_id,
                event,
            })
            .is_ok()
    }
}
