//! Chat messages. Append-only.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::AccountId;
use super::team::TeamId;

pub type MessageId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub sender_id: AccountId,
    pub team_id: Option<TeamId>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub content: String,
    pub sender_id: AccountId,
    pub team_id: Option<TeamId>,
}
