//! Teams and team memberships.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::{AccountId, ProfileSummary};
use super::{require_text, ValidationError};

pub type TeamId = Uuid;
pub type MembershipId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub created_by: Option<AccountId>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTeam {
    pub name: String,
    pub created_by: Option<AccountId>,
}

impl NewTeam {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("team name", &self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Owner,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub id: MembershipId,
    pub team_id: TeamId,
    pub user_id: AccountId,
    pub role: TeamRole,
    pub joined_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMembership {
    pub team_id: TeamId,
    pub user_id: AccountId,
    pub role: TeamRole,
}

/// Membership joined with the member's profile summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMember {
    pub membership: TeamMembership,
    pub profile: ProfileSummary,
}
