/// Favorite/dislike marking on a track
use serde::{Deserialize, Serialize};

/// The two kinds of preference a user can mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceKind {
    Favorite,
    Dislike,
}

impl PreferenceKind {
    /// The mutually exclusive counterpart
    pub fn opposite(self) -> Self {
        match self {
            Self::Favorite => Self::Dislike,
            Self::Dislike => Self::Favorite,
        }
    }
}

/// Preference state of one track for one user mode
///
/// A single value rather than two flags, so a track can never be both
/// favorited and disliked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreferenceState {
    #[default]
    Unmarked,
    Favorited,
    Disliked,
}

impl PreferenceState {
    /// Build from the pair of wire flags. Returns `None` when both are set.
    pub fn from_flags(favorite: bool, dislike: bool) -> Option<Self> {
        match (favorite, dislike) {
            (false, false) => Some(Self::Unmarked),
            (true, false) => Some(Self::Favorited),
            (false, true) => Some(Self::Disliked),
            (true, true) => None,
        }
    }

    /// The state this one marks, if any
    pub fn kind(self) -> Option<PreferenceKind> {
        match self {
            Self::Unmarked => None,
            Self::Favorited => Some(PreferenceKind::Favorite),
            Self::Disliked => Some(PreferenceKind::Dislike),
        }
    }

    /// State marked with `kind`
    pub fn marked(kind: PreferenceKind) -> Self {
        match kind {
            PreferenceKind::Favorite => Self::Favorited,
            PreferenceKind::Dislike => Self::Disliked,
        }
    }

    /// Whether this state includes `kind`
    pub fn has(self, kind: PreferenceKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Result of toggling `kind` from this state.
    ///
    /// Toggling the kind already set clears it; toggling the other kind
    /// replaces it.
    pub fn toggled(self, kind: PreferenceKind) -> Self {
        if self.has(kind) {
            Self::Unmarked
        } else {
            Self::marked(kind)
        }
    }

    pub fn is_favorite(self) -> bool {
        self == Self::Favorited
    }

    pub fn is_disliked(self) -> bool {
        self == Self::Disliked
    }
}
