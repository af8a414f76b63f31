//! Project records and lifecycle.
//!
//! # Invariants
//! - Status moves `active -> completed` only; there is no reopen path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::AccountId;
use super::team::TeamId;
use super::{non_blank, require_text, ValidationError};

pub type ProjectId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub owner_id: AccountId,
    pub team_id: Option<TeamId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Project {
    pub fn is_completed(&self) -> bool {
        self.status == ProjectStatus::Completed
    }

    pub fn is_owned_by(&self, account: AccountId) -> bool {
        self.owner_id == account
    }
}

/// Form input for creating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: Option<String>,
    pub team_id: Option<TeamId>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("project name", &self.name)
    }

    /// Builds the insert payload for `owner`; new projects start `active`.
    pub fn into_new_project(self, owner: AccountId) -> NewProject {
        NewProject {
            name: self.name.trim().to_string(),
            description: non_blank(self.description),
            status: ProjectStatus::Active,
            owner_id: owner,
            team_id: self.team_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub owner_id: AccountId,
    pub team_id: Option<TeamId>,
}
