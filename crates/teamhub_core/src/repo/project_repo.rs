//! Project reads and writes.

use super::team_repo::TeamRepository;
use super::{decode_row, decode_rows, decode_updated, encode, id_value, RepoError, RepoResult};
use crate::model::profile::AccountId;
use crate::model::project::{NewProject, Project, ProjectId, ProjectStatus};
use crate::model::team::TeamId;
use crate::remote::{eq_filter, Direction, Query, RemoteStore, Table};
use serde_json::json;

pub struct ProjectRepository<'r> {
    remote: &'r dyn RemoteStore,
}

impl<'r> ProjectRepository<'r> {
    pub fn new(remote: &'r dyn RemoteStore) -> Self {
        Self { remote }
    }

    pub fn get(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let rows = self
            .remote
            .select(&Query::table(Table::Projects).eq("id", id_value(id)))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(Table::Projects, row))
            .transpose()
    }

    /// Team id of a project; `NotFound` when the project does not exist.
    pub fn team_of(&self, id: ProjectId) -> RepoResult<Option<TeamId>> {
        match self.get(id)? {
            Some(project) => Ok(project.team_id),
            None => Err(RepoError::NotFound {
                table: Table::Projects,
                id,
            }),
        }
    }

    /// Projects `account` owns plus projects of teams it belongs to.
    ///
    /// Newest first by millisecond `created_at`; projects created in the
    /// same millisecond keep owned-before-member order.
    pub fn list_for_account(&self, account: AccountId) -> RepoResult<Vec<Project>> {
        let owned_rows = self.remote.select(
            &Query::table(Table::Projects)
                .eq("owner_id", id_value(account))
                .order_by("created_at", Direction::Descending),
        )?;
        let mut projects: Vec<Project> = decode_rows(Table::Projects, owned_rows)?;

        let team_ids: Vec<TeamId> = TeamRepository::new(self.remote)
            .memberships_of(account)?
            .into_iter()
            .map(|membership| membership.team_id)
            .collect();
        if !team_ids.is_empty() {
            let member_rows = self.remote.select(
                &Query::table(Table::Projects)
                    .is_in("team_id", team_ids.into_iter().map(id_value))
                    .neq("owner_id", id_value(account))
                    .order_by("created_at", Direction::Descending),
            )?;
            projects.extend(decode_rows::<Project>(Table::Projects, member_rows)?);
        }

        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    pub fn create(&self, project: &NewProject) -> RepoResult<Project> {
        let row = self
            .remote
            .insert(Table::Projects, encode(Table::Projects, project)?)?;
        decode_row(Table::Projects, row)
    }

    pub fn set_status(&self, id: ProjectId, status: ProjectStatus) -> RepoResult<Project> {
        let patch = encode(Table::Projects, &json!({ "status": status }))?;
        let rows = self
            .remote
            .update(Table::Projects, patch, &eq_filter("id", id_value(id)))?;
        decode_updated(Table::Projects, id, rows)
    }
}
