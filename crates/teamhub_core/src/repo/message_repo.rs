//! Chat message reads and appends.

use super::{decode_row, decode_rows, encode, id_value, RepoResult};
use crate::model::message::{Message, NewMessage};
use crate::model::team::TeamId;
use crate::remote::{Direction, Query, RemoteStore, Table};

pub struct MessageRepository<'r> {
    remote: &'r dyn RemoteStore,
}

impl<'r> MessageRepository<'r> {
    pub fn new(remote: &'r dyn RemoteStore) -> Self {
        Self { remote }
    }

    /// Messages oldest first, scoped to `team` when given.
    pub fn list(&self, team: Option<TeamId>) -> RepoResult<Vec<Message>> {
        let mut query =
            Query::table(Table::Messages).order_by("created_at", Direction::Ascending);
        if let Some(team_id) = team {
            query = query.eq("team_id", id_value(team_id));
        }
        let rows = self.remote.select(&query)?;
        decode_rows(Table::Messages, rows)
    }

    pub fn append(&self, message: &NewMessage) -> RepoResult<Message> {
        let row = self
            .remote
            .insert(Table::Messages, encode(Table::Messages, message)?)?;
        decode_row(Table::Messages, row)
    }
}
