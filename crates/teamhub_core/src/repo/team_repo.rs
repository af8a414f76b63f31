//! Teams and memberships.

use super::profile_repo::{attach_profiles, ProfileRepository};
use super::{decode_row, decode_rows, encode, id_value, RepoResult};
use crate::model::profile::AccountId;
use crate::model::team::{NewMembership, NewTeam, ProjectMember, Team, TeamId, TeamMembership};
use crate::remote::{Direction, Query, RemoteStore, Table};

pub struct TeamRepository<'r> {
    remote: &'r dyn RemoteStore,
}

impl<'r> TeamRepository<'r> {
    pub fn new(remote: &'r dyn RemoteStore) -> Self {
        Self { remote }
    }

    pub fn create_team(&self, team: &NewTeam) -> RepoResult<Team> {
        let row = self.remote.insert(Table::Teams, encode(Table::Teams, team)?)?;
        decode_row(Table::Teams, row)
    }

    pub fn add_member(&self, membership: &NewMembership) -> RepoResult<TeamMembership> {
        let row = self
            .remote
            .insert(Table::TeamMembers, encode(Table::TeamMembers, membership)?)?;
        decode_row(Table::TeamMembers, row)
    }

    pub fn find_membership(
        &self,
        team_id: TeamId,
        user_id: AccountId,
    ) -> RepoResult<Option<TeamMembership>> {
        let rows = self.remote.select(
            &Query::table(Table::TeamMembers)
                .eq("team_id", id_value(team_id))
                .eq("user_id", id_value(user_id)),
        )?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(Table::TeamMembers, row))
            .transpose()
    }

    pub fn memberships_of(&self, user_id: AccountId) -> RepoResult<Vec<TeamMembership>> {
        let rows = self.remote.select(
            &Query::table(Table::TeamMembers)
                .eq("user_id", id_value(user_id))
                .order_by("joined_at", Direction::Ascending),
        )?;
        decode_rows(Table::TeamMembers, rows)
    }

    pub fn members_of(&self, team_id: TeamId) -> RepoResult<Vec<TeamMembership>> {
        let rows = self.remote.select(
            &Query::table(Table::TeamMembers)
                .eq("team_id", id_value(team_id))
                .order_by("joined_at", Direction::Ascending),
        )?;
        decode_rows(Table::TeamMembers, rows)
    }

    /// Members of `team_id` with profile summaries attached.
    ///
    /// Two queries: memberships, then the referenced profiles.
    pub fn members_with_profiles(&self, team_id: TeamId) -> RepoResult<Vec<ProjectMember>> {
        let memberships = self.members_of(team_id)?;
        if memberships.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = ProfileRepository::new(self.remote)
            .summaries_for(memberships.iter().map(|membership| membership.user_id))?;
        Ok(
            attach_profiles(memberships, |membership| membership.user_id, &profiles)
                .into_iter()
                .map(|(membership, profile)| ProjectMember {
                    membership,
                    profile,
                })
                .collect(),
        )
    }
}
