use serde::{Deserialize, Serialize};

use crate::UserId;

/// Verified identity persisted in the authenticated session.
///
/// Carries only what the session layer proved. Account flags are not cached
/// here; access decisions re-read them from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    username: String,
}

impl UserIdentity {
    /// Creates an identity from a verified login.
    #[must_use]
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the login name captured at authentication time.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }
}
