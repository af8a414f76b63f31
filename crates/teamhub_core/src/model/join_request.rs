//! Requests to join a project's team.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::{AccountId, ProfileSummary};
use super::project::ProjectId;

pub type JoinRequestId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: JoinRequestId,
    pub project_id: ProjectId,
    pub user_id: AccountId,
    pub status: JoinRequestStatus,
    pub message: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewJoinRequest {
    pub project_id: ProjectId,
    pub user_id: AccountId,
    pub status: JoinRequestStatus,
    pub message: Option<String>,
}

/// Join request joined with the requester's profile summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequestWithProfile {
    pub request: JoinRequest,
    pub profile: ProfileSummary,
}
