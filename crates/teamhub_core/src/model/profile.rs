//! Account profile records.
//!
//! One profile per account, keyed by the account id. Profiles are created by
//! the backend at signup and changed only through self-service updates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_text, ValidationError};

/// Account identifier issued by the authentication backend.
pub type AccountId = Uuid;

/// Placeholder username for references that resolve to no profile.
pub const UNKNOWN_USERNAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Same value as the owning account id.
    pub id: AccountId,
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Profile {
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Display subset of a profile attached to joined read models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,
    pub avatar_url: Option<String>,
}

impl ProfileSummary {
    /// Sentinel used when a foreign key has no matching profile row.
    pub fn unknown() -> Self {
        Self {
            username: UNKNOWN_USERNAME.to_string(),
            avatar_url: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.username == UNKNOWN_USERNAME && self.avatar_url.is_none()
    }
}

/// Insert payload used by the signup side of the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProfile {
    pub id: AccountId,
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl NewProfile {
    pub fn new(id: AccountId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            bio: None,
            avatar_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("username", &self.username)
    }
}

/// Partial self-service update.
///
/// Outer `None` leaves a column untouched; `Some(None)` clears a nullable
/// column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::NothingToUpdate);
        }
        match &self.username {
            Some(username) => require_text("username", username),
            None => Ok(()),
        }
    }
}
