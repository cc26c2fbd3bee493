//! Lyra Playback
//!
//! Playback control for Lyra clients.
//!
//! This crate provides:
//! - Playback transport over a pluggable media backend
//! - Queue of track ids with a current-track cursor
//! - Sequential and shuffled queue navigation
//! - The playback controller that ties repository, session store,
//!   preferences and transport together
//! - A silent headless backend
//!
//! # Architecture
//!
//! `lyra-playback` never talks to an audio device or the network itself:
//! - Media rendering comes in through [`MediaBackend`]
//! - Track data comes in through `lyra_core::TrackRepository`
//! - Preferences go through `lyra_sync::PreferenceSynchronizer`
//!
//! # Example: Queue Navigation
//!
//! ```rust
//! use lyra_core::TrackId;
//! use lyra_playback::{navigator, Queue};
//! use rand::SeedableRng;
//!
//! let mut queue = Queue::from_ids([1, 2, 3].map(TrackId::new));
//! queue.set_current(TrackId::new(2));
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! assert_eq!(navigator::next(&queue, false, &mut rng), Some(TrackId::new(3)));
//! assert_eq!(navigator::prev(&queue, false, &mut rng), Some(TrackId::new(1)));
//! ```

pub mod backend;
mod catalog;
mod controller;
mod error;
pub mod events;
pub mod navigator;
mod queue;
mod transport;
pub mod types;

pub use backend::SilentBackend;
pub use catalog::Catalog;
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use events::{MediaEvent, MediaEventSink, TransportEvent};
pub use queue::Queue;
pub use transport::{MediaBackend, PlaybackTransport};
pub use types::{ErrorInfo, PlaybackConfig, PlaybackSnapshot, PlaybackState};
