//! Projects visible to the session account.
//!
//! # Invariants
//! - The snapshot holds owned projects plus projects of the account's teams.
//! - `mark_completed` never moves a project back to `active`.

use super::{
    report_mutation, Mirror, Placement, Precondition, ResourceStore, StoreContext, StoreError,
    StoreResult,
};
use crate::model::project::{Project, ProjectDraft, ProjectId, ProjectStatus};
use crate::remote::{ChannelSpec, Table};
use crate::repo::id_value;
use crate::repo::project_repo::ProjectRepository;

pub struct ProjectStore<'r> {
    ctx: StoreContext<'r>,
    mirror: Mirror<Project>,
}

impl<'r> ProjectStore<'r> {
    pub fn new(ctx: StoreContext<'r>) -> Self {
        Self {
            ctx,
            mirror: Mirror::new(),
        }
    }

    pub fn find(&self, id: ProjectId) -> Option<&Project> {
        self.mirror.find(|project| project.id == id)
    }

    pub fn with_status(&self, status: ProjectStatus) -> Vec<&Project> {
        self.items()
            .iter()
            .filter(|project| project.status == status)
            .collect()
    }

    /// Whether the session account owns `id`; `false` for unknown projects.
    pub fn is_owner(&self, id: ProjectId) -> bool {
        match (self.find(id), self.ctx.session.account_id()) {
            (Some(project), Some(account)) => project.is_owned_by(account),
            _ => false,
        }
    }

    pub fn create_project(&mut self, draft: ProjectDraft) -> StoreResult<Project> {
        let ctx = self.ctx;
        let result = ctx.require_account().and_then(|owner| {
            draft.validate()?;
            ProjectRepository::new(ctx.remote)
                .create(&draft.into_new_project(owner))
                .map_err(StoreError::Write)
        });
        let project =
            report_mutation(&ctx, "create_project", "Failed to create project", result)?;

        ctx.notifier.success("Project created successfully!");
        self.mirror.merge(project.clone(), Placement::Front, |existing| {
            existing.id == project.id
        });
        Ok(project)
    }

    /// Marks a project finished. Already-completed projects are returned
    /// unchanged without a write.
    pub fn mark_completed(&mut self, id: ProjectId) -> StoreResult<Project> {
        let ctx = self.ctx;
        let result = ctx.require_account().and_then(|_| {
            let current = self
                .find(id)
                .ok_or(StoreError::Precondition(Precondition::UnknownProject(id)))?;
            if current.is_completed() {
                return Ok(None);
            }
            ProjectRepository::new(ctx.remote)
                .set_status(id, ProjectStatus::Completed)
                .map(Some)
                .map_err(StoreError::Write)
        });

        match report_mutation(&ctx, "mark_completed", "Failed to update project", result)? {
            Some(project) => {
                ctx.notifier.success("Project marked as finished!");
                self.mirror.merge(project.clone(), Placement::Front, |existing| {
                    existing.id == project.id
                });
                Ok(project)
            }
            None => self
                .find(id)
                .cloned()
                .ok_or(StoreError::Precondition(Precondition::UnknownProject(id))),
        }
    }
}

impl<'r> ResourceStore<'r> for ProjectStore<'r> {
    type Item = Project;

    const RESOURCE: &'static str = "projects";

    fn context(&self) -> StoreContext<'r> {
        self.ctx
    }

    fn mirror(&self) -> &Mirror<Project> {
        &self.mirror
    }

    fn mirror_mut(&mut self) -> &mut Mirror<Project> {
        &mut self.mirror
    }

    fn load(&self) -> StoreResult<Option<Vec<Project>>> {
        let Some(account) = self.ctx.session.account_id() else {
            return Ok(None);
        };
        ProjectRepository::new(self.ctx.remote)
            .list_for_account(account)
            .map(Some)
            .map_err(StoreError::Read)
    }

    fn channels(&self) -> Vec<ChannelSpec> {
        match self.ctx.session.account_id() {
            Some(account) => vec![
                ChannelSpec::table(Table::Projects),
                ChannelSpec::table(Table::TeamMembers).filter_eq("user_id", id_value(account)),
            ],
            None => Vec::new(),
        }
    }
}
