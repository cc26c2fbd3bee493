//! Domain types for Lyra

mod ids;
mod preference;
mod session;
mod track;

pub use ids::TrackId;
pub use preference::{PreferenceKind, PreferenceState};
pub use session::{Role, Session};
pub use track::{Track, TrackQuery, TrackStats};
