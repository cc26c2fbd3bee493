/// Authenticated session handed over by the auth collaborator
use serde::{Deserialize, Serialize};
use std::fmt;

/// User role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Authenticated session
///
/// Created at login and dropped at logout by the external auth provider.
/// The bearer credential is opaque to Lyra.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            role,
            token: token.into(),
        }
    }

    /// Bearer credential for the `Authorization` header
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// Keep the credential out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}
