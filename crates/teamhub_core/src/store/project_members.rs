//! Members of the team attached to one project.
//!
//! # Invariants
//! - Membership events are only watched for the project's current team.
//! - A team reassignment on the project moves the membership channel to
//!   the new team after the refetch that observed it.

use super::{
    open_channels, refresh_pending, Mirror, ResourceStore, StoreContext, StoreError, StoreResult,
};
use crate::model::project::ProjectId;
use crate::model::team::{ProjectMember, TeamId};
use crate::remote::{ChannelSpec, Table};
use crate::repo::id_value;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::team_repo::TeamRepository;
use log::debug;
use std::cell::Cell;

/// Read-only view; membership changes arrive through join-request approval.
pub struct ProjectMemberStore<'r> {
    ctx: StoreContext<'r>,
    project: Option<ProjectId>,
    /// Team seen by the last successful load.
    team: Cell<Option<TeamId>>,
    /// Team the open membership channel is filtered on.
    watched_team: Option<TeamId>,
    mirror: Mirror<ProjectMember>,
}

impl<'r> ProjectMemberStore<'r> {
    pub fn new(ctx: StoreContext<'r>, project: Option<ProjectId>) -> Self {
        Self {
            ctx,
            project,
            team: Cell::new(None),
            watched_team: None,
            mirror: Mirror::new(),
        }
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// Team of the current project, once loaded.
    pub fn team(&self) -> Option<TeamId> {
        self.team.get()
    }

    pub fn set_project(&mut self, project: Option<ProjectId>) -> StoreResult<()> {
        if self.project == project {
            return Ok(());
        }
        self.project = project;
        self.team.set(None);
        self.mount()
    }

    fn follow_team(&mut self) {
        let team = self.team.get();
        if team == self.watched_team {
            return;
        }
        debug!(
            "event=store_follow module=store status=ok resource={} team={}",
            Self::RESOURCE,
            team.map(|id| id.to_string()).unwrap_or_else(|| "none".to_string())
        );
        if open_channels(self).is_ok() {
            self.watched_team = team;
        }
    }
}

impl<'r> ResourceStore<'r> for ProjectMemberStore<'r> {
    type Item = ProjectMember;

    const RESOURCE: &'static str = "team members";

    fn context(&self) -> StoreContext<'r> {
        self.ctx
    }

    fn mirror(&self) -> &Mirror<ProjectMember> {
        &self.mirror
    }

    fn mirror_mut(&mut self) -> &mut Mirror<ProjectMember> {
        &mut self.mirror
    }

    /// Project without a team yields an empty member list.
    fn load(&self) -> StoreResult<Option<Vec<ProjectMember>>> {
        let Some(project) = self.project.filter(|_| self.ctx.session.is_authenticated()) else {
            self.team.set(None);
            return Ok(None);
        };
        let team = ProjectRepository::new(self.ctx.remote)
            .team_of(project)
            .map_err(StoreError::Read)?;
        self.team.set(team);
        let Some(team_id) = team else {
            return Ok(Some(Vec::new()));
        };
        TeamRepository::new(self.ctx.remote)
            .members_with_profiles(team_id)
            .map(Some)
            .map_err(StoreError::Read)
    }

    fn channels(&self) -> Vec<ChannelSpec> {
        let Some(project) = self.project.filter(|_| self.ctx.session.is_authenticated()) else {
            return Vec::new();
        };
        let mut specs =
            vec![ChannelSpec::table(Table::Projects).filter_eq("id", id_value(project))];
        if let Some(team) = self.team.get() {
            specs.push(ChannelSpec::table(Table::TeamMembers).filter_eq("team_id", id_value(team)));
        }
        specs
    }

    /// The team is only known after the first load, so the membership
    /// channel may be opened right after it.
    fn mount(&mut self) -> StoreResult<()> {
        self.mirror.begin_initial_load();
        open_channels(self)?;
        self.watched_team = self.team.get();
        let loaded = self.refresh();
        self.follow_team();
        loaded
    }

    fn process_notifications(&mut self) -> usize {
        let pending = refresh_pending(self);
        self.follow_team();
        pending
    }
}
