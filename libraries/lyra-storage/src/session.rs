//! Well-known session keys and typed accessors
//!
//! Values written here stay readable by older clients: the current track id
//! is stored as a JSON string and id lists as JSON arrays of numbers.
//!
//! Readers are lenient. A missing key, a value of the wrong shape, or an
//! unparseable id all read back as "nothing stored" and are logged, so a
//! damaged entry never blocks startup.

use lyra_core::{Result, SessionStore, TrackId};
use serde_json::Value;

/// Last selected track
pub const KEY_CURRENT_TRACK_ID: &str = "currentTrackId";

/// Anonymous favorites, as a JSON array of track ids
pub const KEY_FAVORITES: &str = "favorites";

/// Anonymous dislikes, as a JSON array of track ids
pub const KEY_DISLIKES: &str = "dislikes";

/// Read the persisted current track id
///
/// # Errors
///
/// Returns an error only when the store itself fails
pub async fn current_track_id<S>(store: &S) -> Result<Option<TrackId>>
where
    S: SessionStore + ?Sized,
{
    let Some(value) = store.get(KEY_CURRENT_TRACK_ID).await? else {
        return Ok(None);
    };

    let id = match &value {
        Value::String(s) => s.parse::<TrackId>().ok(),
        Value::Number(n) => n.as_i64().map(TrackId::new),
        _ => None,
    };

    if id.is_none() {
        tracing::warn!(value = %value, "Ignoring unreadable persisted track id");
    }
    Ok(id)
}

/// Persist the current track id
pub async fn set_current_track_id<S>(store: &S, id: TrackId) -> Result<()>
where
    S: SessionStore + ?Sized,
{
    store
        .set(KEY_CURRENT_TRACK_ID, &Value::String(id.to_string()))
        .await
}

/// Read an id list, in stored order
///
/// Entries may be numbers or numeric strings. Anything else is skipped.
pub async fn id_list<S>(store: &S, key: &str) -> Result<Vec<TrackId>>
where
    S: SessionStore + ?Sized,
{
    let Some(value) = store.get(key).await? else {
        return Ok(Vec::new());
    };

    let Value::Array(items) = value else {
        tracing::warn!(key, "Stored id list is not an array, treating as empty");
        return Ok(Vec::new());
    };

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let id = match &item {
            Value::Number(n) => n.as_i64().map(TrackId::new),
            Value::String(s) => s.parse::<TrackId>().ok(),
            _ => None,
        };
        match id {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => tracing::warn!(key, entry = %item, "Skipping unreadable id list entry"),
        }
    }
    Ok(ids)
}

/// Replace an id list
pub async fn set_id_list<S>(store: &S, key: &str, ids: &[TrackId]) -> Result<()>
where
    S: SessionStore + ?Sized,
{
    let value = Value::Array(ids.iter().map(|id| Value::from(id.as_i64())).collect());
    store.set(key, &value).await
}
