//! Lyra Sync
//!
//! Favorite/dislike synchronization and change notifications.
//!
//! # Architecture
//!
//! - **`NotificationBus`**: in-process publish/subscribe for the
//!   `favoritesUpdated` / `dislikesUpdated` signals
//! - **`PreferenceSynchronizer`**: the mutually exclusive favorite/dislike
//!   state machine, with a backend chosen by session state
//! - **Strategies**: `RemoteStrategy` (catalog service) and `LocalStrategy`
//!   (session store id lists)
//!
//! # Example
//!
//! ```rust
//! use lyra_core::{PreferenceState, TrackId};
//! use lyra_storage::MemorySessionStore;
//! use lyra_sync::{Notification, NotificationBus, PreferenceSynchronizer};
//! use std::sync::Arc;
//!
//! # async fn example() -> lyra_sync::Result<()> {
//! let sync = PreferenceSynchronizer::new(
//!     NotificationBus::new(),
//!     Arc::new(MemorySessionStore::new()),
//!     None,
//!     true,
//! );
//! sync.switch_mode(false).await?;
//!
//! let mut observer = sync.subscribe();
//! let state = sync.toggle_favorite(TrackId::new(5)).await?;
//! assert_eq!(state, PreferenceState::Favorited);
//! assert_eq!(observer.try_recv(), Some(Notification::FavoritesUpdated));
//! # Ok(())
//! # }
//! ```

mod bus;
mod error;
mod strategy;
mod synchronizer;

pub use bus::{Notification, NotificationBus, Subscription};
pub use error::{Result, SyncError};
pub use strategy::{LocalStrategy, PreferenceStrategy, RemoteStrategy};
pub use synchronizer::{PreferenceMode, PreferenceSynchronizer};
