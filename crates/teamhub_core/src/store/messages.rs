//! Chat messages, optionally scoped to one team.

use super::{
    report_mutation, Mirror, Placement, ResourceStore, StoreContext, StoreError, StoreResult,
};
use crate::model::message::{Message, NewMessage};
use crate::model::team::TeamId;
use crate::remote::{ChannelSpec, Table};
use crate::repo::id_value;
use crate::repo::message_repo::MessageRepository;

pub struct MessageStore<'r> {
    ctx: StoreContext<'r>,
    team: Option<TeamId>,
    mirror: Mirror<Message>,
}

impl<'r> MessageStore<'r> {
    /// `team = None` mirrors every message visible to the account.
    pub fn new(ctx: StoreContext<'r>, team: Option<TeamId>) -> Self {
        Self {
            ctx,
            team,
            mirror: Mirror::new(),
        }
    }

    pub fn team(&self) -> Option<TeamId> {
        self.team
    }

    /// Switches the team scope and remounts when it changed.
    pub fn set_team(&mut self, team: Option<TeamId>) -> StoreResult<()> {
        if self.team == team {
            return Ok(());
        }
        self.team = team;
        self.mount()
    }

    /// Appends a message to the current team scope.
    ///
    /// Blank content is ignored: no write, no notice, `Ok(None)`.
    pub fn send_message(&mut self, content: &str) -> StoreResult<Option<Message>> {
        let ctx = self.ctx;
        let team = self.team;
        let result = ctx.require_account().and_then(|sender| {
            if content.trim().is_empty() {
                return Ok(None);
            }
            MessageRepository::new(ctx.remote)
                .append(&NewMessage {
                    content: content.to_string(),
                    sender_id: sender,
                    team_id: team,
                })
                .map(Some)
                .map_err(StoreError::Write)
        });

        let sent = report_mutation(&ctx, "send_message", "Failed to send message", result)?;
        if let Some(message) = &sent {
            self.mirror
                .merge(message.clone(), Placement::Back, |existing| {
                    existing.id == message.id
                });
        }
        Ok(sent)
    }
}

impl<'r> ResourceStore<'r> for MessageStore<'r> {
    type Item = Message;

    const RESOURCE: &'static str = "messages";

    fn context(&self) -> StoreContext<'r> {
        self.ctx
    }

    fn mirror(&self) -> &Mirror<Message> {
        &self.mirror
    }

    fn mirror_mut(&mut self) -> &mut Mirror<Message> {
        &mut self.mirror
    }

    fn load(&self) -> StoreResult<Option<Vec<Message>>> {
        if !self.ctx.session.is_authenticated() {
            return Ok(None);
        }
        MessageRepository::new(self.ctx.remote)
            .list(self.team)
            .map(Some)
            .map_err(StoreError::Read)
    }

    fn channels(&self) -> Vec<ChannelSpec> {
        if !self.ctx.session.is_authenticated() {
            return Vec::new();
        }
        let spec = ChannelSpec::table(Table::Messages);
        match self.team {
            Some(team) => vec![spec.filter_eq("team_id", id_value(team))],
            None => vec![spec],
        }
    }
}
