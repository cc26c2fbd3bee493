//! Where preference changes are written
//!
//! The synchronizer picks one strategy per session state: the remote service
//! when a session exists, the session store otherwise.

use async_trait::async_trait;
use lyra_core::{
    PreferenceKind, PreferenceService, PreferenceState, Result, SessionStore, TrackId,
};
use lyra_storage::session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Backend that makes a transition durable
#[async_trait]
pub trait PreferenceStrategy: Send + Sync {
    /// Persist the change of `id` from `from` to `to`.
    ///
    /// On error the durable state must be as it was before the call, as far
    /// as the backend allows.
    async fn apply(&self, id: TrackId, from: PreferenceState, to: PreferenceState) -> Result<()>;

    /// Initial in-memory view for this strategy
    async fn load(&self) -> Result<HashMap<TrackId, PreferenceState>>;
}

// =============================================================================
// Local
// =============================================================================

/// Anonymous preferences kept as two id lists in the session store
pub struct LocalStrategy {
    store: Arc<dyn SessionStore>,
    // Serializes read-modify-write cycles on the two lists.
    write_lock: Mutex<()>,
}

impl LocalStrategy {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn lists(&self) -> Result<(Vec<TrackId>, Vec<TrackId>)> {
        let favorites = session::id_list(self.store.as_ref(), session::KEY_FAVORITES).await?;
        let dislikes = session::id_list(self.store.as_ref(), session::KEY_DISLIKES).await?;
        Ok((favorites, dislikes))
    }
}

#[async_trait]
impl PreferenceStrategy for LocalStrategy {
    async fn apply(&self, id: TrackId, from: PreferenceState, to: PreferenceState) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let (favorites, dislikes) = self.lists().await?;

        let rewrite = |list: &[TrackId], kind: PreferenceKind| -> Vec<TrackId> {
            let mut next: Vec<TrackId> = list.iter().copied().filter(|x| *x != id).collect();
            if to.has(kind) {
                next.push(id);
            }
            next
        };
        let next_favorites = rewrite(&favorites, PreferenceKind::Favorite);
        let next_dislikes = rewrite(&dislikes, PreferenceKind::Dislike);

        let favorites_changed = next_favorites != favorites;
        let dislikes_changed = next_dislikes != dislikes;

        if favorites_changed {
            session::set_id_list(self.store.as_ref(), session::KEY_FAVORITES, &next_favorites)
                .await?;
        }

        if dislikes_changed {
            if let Err(e) =
                session::set_id_list(self.store.as_ref(), session::KEY_DISLIKES, &next_dislikes)
                    .await
            {
                if favorites_changed {
                    if let Err(revert) =
                        session::set_id_list(self.store.as_ref(), session::KEY_FAVORITES, &favorites)
                            .await
                    {
                        warn!(track_id = %id, error = %revert, "Failed to revert favorites list");
                    }
                }
                return Err(e);
            }
        }

        tracing::debug!(track_id = %id, ?from, ?to, "Local preference lists updated");
        Ok(())
    }

    async fn load(&self) -> Result<HashMap<TrackId, PreferenceState>> {
        let (favorites, dislikes) = self.lists().await?;

        let mut states = HashMap::with_capacity(favorites.len() + dislikes.len());
        for id in dislikes {
            states.insert(id, PreferenceState::Disliked);
        }
        for id in favorites {
            if states.insert(id, PreferenceState::Favorited).is_some() {
                warn!(track_id = %id, "Track stored as both favorite and dislike, keeping favorite");
            }
        }
        Ok(states)
    }
}

// =============================================================================
// Remote
// =============================================================================

/// Server-owned preferences for the signed-in user
pub struct RemoteStrategy {
    service: Arc<dyn PreferenceService>,
}

impl RemoteStrategy {
    pub fn new(service: Arc<dyn PreferenceService>) -> Self {
        Self { service }
    }

    async fn add(&self, kind: PreferenceKind, id: TrackId) -> Result<()> {
        match kind {
            PreferenceKind::Favorite => self.service.add_favorite(id).await,
            PreferenceKind::Dislike => self.service.add_dislike(id).await,
        }
    }

    async fn remove(&self, kind: PreferenceKind, id: TrackId) -> Result<()> {
        match kind {
            PreferenceKind::Favorite => self.service.remove_favorite(id).await,
            PreferenceKind::Dislike => self.service.remove_dislike(id).await,
        }
    }
}

#[async_trait]
impl PreferenceStrategy for RemoteStrategy {
    async fn apply(&self, id: TrackId, from: PreferenceState, to: PreferenceState) -> Result<()> {
        match (from.kind(), to.kind()) {
            (None, None) => Ok(()),
            (None, Some(added)) => self.add(added, id).await,
            (Some(removed), None) => self.remove(removed, id).await,
            (Some(removed), Some(added)) if removed == added => Ok(()),
            (Some(removed), Some(added)) => {
                self.remove(removed, id).await?;
                if let Err(e) = self.add(added, id).await {
                    // Put the removed record back so the server matches the unchanged view.
                    if let Err(revert) = self.add(removed, id).await {
                        warn!(
                            track_id = %id,
                            error = %revert,
                            "Failed to restore preference after partial update"
                        );
                    }
                    return Err(e);
                }
                Ok(())
            }
        }
    }

    async fn load(&self) -> Result<HashMap<TrackId, PreferenceState>> {
        // Seeded from fetched track records instead.
        Ok(HashMap::new())
    }
}
